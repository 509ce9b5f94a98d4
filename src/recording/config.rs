//! Recording session types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::codec::Codec;

/// Default spacing between captures (about 33 frames per second).
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

/// Metadata reported once a recording has been finalized.
///
/// By the time a caller holds one of these, the container is closed and
/// playable under `name` (when the sink had one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedInfo {
    /// Output identifier, normally the file path the sink was opened on.
    pub name: Option<String>,
    /// The codec actually used, after any fallback.
    pub codec: Codec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval_is_whole_milliseconds() {
        assert_eq!(DEFAULT_INTERVAL.as_millis(), 30);
        assert_eq!(DEFAULT_INTERVAL.subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_recorded_info_carries_the_codec_used() {
        let info = RecordedInfo {
            name: Some("drawing.avi".to_string()),
            codec: Codec::MotionJpeg,
        };
        assert_eq!(info.clone(), info);
        assert_eq!(info.codec, Codec::MotionJpeg);
    }
}
