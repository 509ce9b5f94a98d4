//! Canvas-to-video recording
//!
//! This module ties the pipeline together:
//! - codec selection and fallback ([`Codec`], [`resolve_codec`])
//! - per-codec frame encoding ([`FrameEncoder`])
//! - the engine and its lifecycle ([`Recorder`])
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use drawrec::{Canvas, Codec, Recorder};
//! use drawrec::recording::create_exclusive_sink;
//!
//! let canvas = Arc::new(Canvas::new(640, 480));
//! let mut recorder = Recorder::new(Arc::clone(&canvas));
//!
//! // The saved preference backs up an H.264 request.
//! let sink = create_exclusive_sink("drawing.avi")?;
//! recorder.start(Box::new(sink), Codec::H264, Some(Codec::Raw), Some("drawing.avi".into()))?;
//!
//! // ... the user draws on the canvas ...
//!
//! let info = recorder.finish()?;
//! println!("recorded {:?} with {}", info.name, info.codec.label());
//! ```

mod codec;
mod config;
mod encoder;
mod recorder;

pub use codec::{h264_available, resolve_codec, Codec};
pub use config::{RecordedInfo, DEFAULT_INTERVAL};
pub use encoder::{EncodedFrame, FrameEncoder};
pub use recorder::{create_exclusive_sink, RecordSink, Recorder};

#[cfg(test)]
mod tests;
