//! drawrec: stroke-by-stroke canvas recording to AVI video
//!
//! This crate is the recording engine behind a desktop drawing app: while
//! the user draws, it periodically snapshots the canvas and appends the
//! frames to an AVI file any stock player can open.
//!
//! # Features
//! - Tear-free capture of a live, concurrently-drawn BGRA canvas
//! - Four codecs: raw, uncompressed, Motion JPEG, and H.264 when a
//!   system encoder is present (with a pure fallback rule when it isn't)
//! - Classic RIFF/AVI output with a seek index, finalized on finish
//! - A strict Idle/Recording lifecycle that misuse cannot corrupt
//!
//! # Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use drawrec::{Canvas, Codec, Recorder};
//! use drawrec::recording::create_exclusive_sink;
//!
//! let canvas = Arc::new(Canvas::new(800, 600));
//! let mut recorder = Recorder::new(Arc::clone(&canvas));
//!
//! // Mouse down: start recording alongside the stroke.
//! let sink = create_exclusive_sink("drawing.avi")?;
//! recorder.start(Box::new(sink), Codec::MotionJpeg, None, Some("drawing.avi".into()))?;
//!
//! // ... strokes mutate the canvas while frames are captured ...
//!
//! // Mouse up (after the configured linger): stop and finalize.
//! let info = recorder.finish()?;
//! ```
pub mod avi;
pub mod errors;
pub mod recording;
pub mod surface;

// Re-exports for convenience
pub use errors::RecordError;
pub use recording::{Codec, RecordedInfo, Recorder};
pub use surface::{Bgra, Canvas};

/// Initialize logging for the recording pipeline
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "drawrec=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
