//! Codec selection and fallback

use log::warn;
use serde::{Deserialize, Serialize};

/// Video stream encoding selections.
///
/// The set is closed: every recording uses exactly one of these, chosen
/// at start and fixed for the session. Serde derives let the UI driver
/// persist the preference as an opaque record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Codec {
    /// Native bottom-up rows written to the container untouched.
    Raw,
    /// Top-down rows written to the container untouched.
    Uncompressed,
    /// Every frame an independent JPEG; a truncated file still plays up
    /// to the last complete frame.
    MotionJpeg,
    /// System H.264 encoder; only offered when one is present.
    H264,
}

impl Codec {
    /// True when capture must hand this codec bottom-up rows.
    pub fn flips_rows(self) -> bool {
        matches!(self, Codec::Raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            Codec::Raw => "Raw (bottom-up)",
            Codec::Uncompressed => "Uncompressed",
            Codec::MotionJpeg => "Motion JPEG",
            Codec::H264 => "H.264 (MPEG-4 AVC)",
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::MotionJpeg
    }
}

/// Probe for a usable H.264 encoder.
///
/// Encoder availability can change while the application runs, so the
/// engine re-checks here at recording start rather than trusting the
/// answer the menu was built from.
pub fn h264_available() -> bool {
    openh264::encoder::Encoder::new().is_ok()
}

/// Choose the codec a recording will actually use.
///
/// A pure function of its three inputs: the request stands unless it is
/// H.264 without an encoder present, in which case the last saved
/// non-H.264 preference wins, and failing that the default
/// ([`Codec::MotionJpeg`]). Never prompts, never blocks.
pub fn resolve_codec(requested: Codec, saved: Option<Codec>, h264_available: bool) -> Codec {
    if requested != Codec::H264 || h264_available {
        return requested;
    }

    let fallback = match saved {
        Some(Codec::H264) | None => Codec::default(),
        Some(codec) => codec,
    };
    warn!(
        "H.264 encoder unavailable; falling back to {}",
        fallback.label()
    );
    fallback
}
