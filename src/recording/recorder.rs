//! The recording engine tying capture, encoding, and the container together

use std::fs::{File, OpenOptions};
use std::io::{Seek, Write};
use std::panic;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use log::{debug, info, warn};

use super::codec::{h264_available, resolve_codec, Codec};
use super::config::{RecordedInfo, DEFAULT_INTERVAL};
use super::encoder::FrameEncoder;
use crate::avi::{AviWriter, FrameRate};
use crate::errors::RecordError;
use crate::surface::Canvas;

/// Byte sink a recording writes into.
///
/// Anything writable and seekable that can move to the capture thread.
/// The sink must be freshly created for this recording; collision
/// handling happens before it is handed over (see
/// [`create_exclusive_sink`]).
pub trait RecordSink: Write + Seek + Send {}

impl<T: Write + Seek + Send> RecordSink for T {}

/// Open `path` for writing, failing (never overwriting) when a file of
/// that name already exists.
pub fn create_exclusive_sink<P: AsRef<Path>>(path: P) -> Result<File, RecordError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path.as_ref())
        .map_err(|e| RecordError::IoError(format!("Failed to create output file: {}", e)))
}

/// Everything one live recording owns: the container writer, the frame
/// encoder, the row-order flag, and the capture buffer reused across
/// ticks. Exactly zero or one exists per engine.
struct Job {
    writer: AviWriter<Box<dyn RecordSink>>,
    encoder: FrameEncoder,
    flip: bool,
    buffer: Vec<u8>,
}

impl Job {
    fn capture_frame(&mut self, canvas: &Canvas) -> Result<(), RecordError> {
        canvas.capture_into(&mut self.buffer, self.flip);
        let frame = self.encoder.encode(&self.buffer)?;
        self.writer
            .write_frame(&frame.data, frame.is_keyframe)
            .map_err(|e| RecordError::MuxingError(format!("Failed to write frame: {}", e)))
    }
}

struct Active {
    stop_tx: Sender<()>,
    worker: JoinHandle<Result<Job, RecordError>>,
    name: Option<String>,
    codec: Codec,
}

/// Captures canvas frames into an AVI sink on a fixed cadence.
///
/// The engine is Idle or Recording, never both: [`start`](Self::start)
/// while recording and [`finish`](Self::finish) while idle are caller
/// bugs and fail with [`RecordError::InvalidOperation`] without touching
/// existing state. One engine serves one canvas for the life of an
/// application window, cycling through any number of start/finish pairs.
pub struct Recorder {
    canvas: Arc<Canvas>,
    interval: Duration,
    active: Option<Active>,
}

impl Recorder {
    /// Engine over `canvas` with the default capture interval.
    pub fn new(canvas: Arc<Canvas>) -> Self {
        Self::with_interval(canvas, DEFAULT_INTERVAL)
    }

    /// Engine with a custom capture interval (whole milliseconds,
    /// nonzero).
    pub fn with_interval(canvas: Arc<Canvas>, interval: Duration) -> Self {
        assert!(
            interval.as_millis() > 0,
            "capture interval must be at least one millisecond"
        );

        Self {
            canvas,
            interval,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// The exact playback rate recordings from this engine declare.
    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::from_interval_ms(self.interval.as_millis() as u32)
    }

    /// Begin recording into `sink` with `requested`, or its fallback.
    ///
    /// An H.264 request is re-validated here, since encoder availability
    /// can change between the menu render and the click; when it is
    /// gone, [`resolve_codec`] picks the replacement from `saved`, the
    /// caller's persisted preference. The codec actually used is the one
    /// [`finish`](Self::finish) reports.
    ///
    /// Writes the container headers, captures one frame immediately (so
    /// even a recording finished before the first tick has content),
    /// then schedules periodic captures. `name` is carried through to
    /// the [`RecordedInfo`] that [`finish`](Self::finish) returns.
    pub fn start(
        &mut self,
        sink: Box<dyn RecordSink>,
        requested: Codec,
        saved: Option<Codec>,
        name: Option<String>,
    ) -> Result<(), RecordError> {
        if self.is_recording() {
            return Err(RecordError::InvalidOperation(
                "can't start: already recording".into(),
            ));
        }

        let codec = match requested {
            Codec::H264 => resolve_codec(requested, saved, h264_available()),
            other => other,
        };

        let encoder = FrameEncoder::new(codec, self.canvas.width(), self.canvas.height())?;
        let writer = AviWriter::create(sink, encoder.stream_format(), self.frame_rate())
            .map_err(|e| {
                RecordError::MuxingError(format!("Failed to write container headers: {}", e))
            })?;

        let mut job = Job {
            writer,
            encoder,
            flip: codec.flips_rows(),
            buffer: vec![0u8; self.canvas.size_in_bytes()],
        };

        // The initial frame, before the schedule starts.
        job.capture_frame(&self.canvas)?;

        let (stop_tx, stop_rx) = bounded(1);
        let canvas = Arc::clone(&self.canvas);
        let interval = self.interval;
        let worker = thread::Builder::new()
            .name("drawrec-capture".into())
            .spawn(move || capture_loop(job, &canvas, interval, &stop_rx))
            .map_err(|e| RecordError::IoError(format!("Failed to spawn capture thread: {}", e)))?;

        info!(
            "recording started: {} at {}x{}, {:.2} fps",
            codec.label(),
            self.canvas.width(),
            self.canvas.height(),
            self.frame_rate().as_f64()
        );

        self.active = Some(Active {
            stop_tx,
            worker,
            name,
            codec,
        });
        Ok(())
    }

    /// Stop capturing, finalize the container, and report what was
    /// recorded.
    ///
    /// Returns only after the index is written and the sink flushed, so
    /// the named output is playable the moment this returns. A capture
    /// failure that ended the schedule early is reported here.
    pub fn finish(&mut self) -> Result<RecordedInfo, RecordError> {
        let active = match self.active.take() {
            Some(active) => active,
            None => {
                return Err(RecordError::InvalidOperation(
                    "can't finish: not recording".into(),
                ))
            }
        };

        // The worker is already gone if a tick failed; the join below
        // still surfaces that error.
        let _ = active.stop_tx.send(());

        let job = match active.worker.join() {
            Ok(result) => result?,
            // A worker panic is a contract violation downstream; keep it
            // fatal rather than converting to a recoverable error.
            Err(payload) => panic::resume_unwind(payload),
        };

        let frames = job.writer.frame_count();
        job.writer
            .close()
            .map_err(|e| RecordError::MuxingError(format!("Failed to finalize container: {}", e)))?;

        info!("recording finished: {} frames", frames);
        Ok(RecordedInfo {
            name: active.name,
            codec: active.codec,
        })
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.is_recording() {
            debug!("recorder dropped while recording; finishing first");
            if let Err(e) = self.finish() {
                warn!("failed to finalize recording during drop: {}", e);
            }
        }
    }
}

// Joined by finish() before the container is closed, so no capture can
// land after finalization. A tick selected in the same instant the stop
// signal arrives completes its append first, which is safe: the frame
// precedes the index.
fn capture_loop(
    mut job: Job,
    canvas: &Canvas,
    interval: Duration,
    stop_rx: &Receiver<()>,
) -> Result<Job, RecordError> {
    let ticker = tick(interval);

    loop {
        select! {
            recv(stop_rx) -> _ => return Ok(job),
            recv(ticker) -> _ => job.capture_frame(canvas)?,
        }
    }
}
