//! AVI container output
//!
//! A minimal writer for the classic RIFF/AVI layout: one `hdrl` header
//! list, one video stream, an interleave-free `movi` list of frame
//! chunks, and a trailing `idx1` index so third-party players can seek.
//! Frame rate is declared once and constant; frames carry no individual
//! timestamps.

mod writer;

pub use writer::{
    fourcc, AviWriter, FourCc, FrameRate, VideoStreamFormat, AVIF_HASINDEX, AVIIF_KEYFRAME,
    BI_RGB,
};
