//! Headless end-to-end demo: stroke a drawing while recording it.
//!
//! Records a short animation of a line sweeping across the canvas and
//! writes `drawing.avi` to the current directory. Fails if the file
//! already exists; pick a fresh directory or remove the old output.
//!
//! Run with: cargo run --example draw_and_record

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use drawrec::recording::create_exclusive_sink;
use drawrec::surface::BLACK;
use drawrec::{Canvas, Codec, Recorder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    drawrec::init_logging();

    let canvas = Arc::new(Canvas::new(320, 240));
    let mut recorder = Recorder::new(Arc::clone(&canvas));

    // Ask for H.264; the engine falls back through the saved preference
    // when no encoder is installed.
    let name = "drawing.avi";
    let sink = create_exclusive_sink(name)?;
    recorder.start(
        Box::new(sink),
        Codec::H264,
        Some(Codec::MotionJpeg),
        Some(name.to_string()),
    )?;

    // One second of drawing: a line sweeping left to right.
    for step in 0..20 {
        let x = step * 16;
        canvas.draw_line(x, 0, x, 239, BLACK);
        thread::sleep(Duration::from_millis(50));
    }

    let info = recorder.finish()?;
    println!(
        "recorded {} with {}",
        info.name.as_deref().unwrap_or("(unnamed)"),
        info.codec.label()
    );
    Ok(())
}
