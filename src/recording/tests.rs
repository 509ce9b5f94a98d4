//! Tests for the recording module

#[cfg(test)]
mod recording_tests {
    use crate::errors::RecordError;
    use crate::recording::{create_exclusive_sink, resolve_codec, Codec, Recorder};
    use crate::surface::{Canvas, BLACK};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_recording_workflow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workflow.avi");

        let canvas = Arc::new(Canvas::new(64, 48));
        let mut recorder =
            Recorder::with_interval(Arc::clone(&canvas), Duration::from_millis(10));

        let sink = create_exclusive_sink(&path).expect("Failed to create sink");
        recorder
            .start(
                Box::new(sink),
                Codec::MotionJpeg,
                None,
                path.to_str().map(String::from),
            )
            .expect("Failed to start recording");
        assert!(recorder.is_recording());

        // Draw while the schedule runs, as a user stroke would.
        canvas.draw_line(0, 0, 63, 47, BLACK);
        thread::sleep(Duration::from_millis(50));

        let info = recorder.finish().expect("Failed to finish");
        assert_eq!(info.codec, Codec::MotionJpeg);
        assert_eq!(info.name.as_deref(), path.to_str());

        let bytes = std::fs::read(&path).expect("Output file should exist");
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"AVI ");
    }

    #[test]
    fn test_exclusive_sink_refuses_collision() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taken.avi");
        std::fs::write(&path, b"existing").unwrap();

        let result = create_exclusive_sink(&path);
        assert!(matches!(result, Err(RecordError::IoError(_))));

        // The existing file is untouched.
        assert_eq!(std::fs::read(&path).unwrap(), b"existing");
    }

    #[test]
    fn test_requested_codec_is_the_one_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("codec.avi");

        let canvas = Arc::new(Canvas::new(16, 16));
        let mut recorder = Recorder::new(canvas);

        let codec = resolve_codec(Codec::Uncompressed, Some(Codec::Raw), false);
        assert_eq!(codec, Codec::Uncompressed);

        let sink = create_exclusive_sink(&path).expect("Failed to create sink");
        recorder
            .start(Box::new(sink), codec, None, None)
            .expect("Failed to start recording");
        let info = recorder.finish().expect("Failed to finish");
        assert_eq!(info.codec, Codec::Uncompressed);
        assert_eq!(info.name, None);
    }

    #[test]
    fn test_codec_labels_are_distinct() {
        let labels = [
            Codec::Raw.label(),
            Codec::Uncompressed.label(),
            Codec::MotionJpeg.label(),
            Codec::H264.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in labels.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
