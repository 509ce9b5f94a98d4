//! Shared drawing surface and pixel capture
//!
//! The [`Canvas`] is the mutable bitmap the UI driver draws on and the
//! recorder snapshots from. Pixels are packed 32-bit BGRA (blue, green,
//! red, alpha), row-major, top row first, the native framebuffer layout.
//!
//! Drawing and capture may run on different threads; the pixel mutex is
//! held only for the duration of a single copy so capture never stalls an
//! in-progress stroke for longer than one memcpy.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// One packed pixel, byte order blue, green, red, alpha.
pub type Bgra = [u8; 4];

/// Opaque white, the initial color of every canvas.
pub const WHITE: Bgra = [0xff, 0xff, 0xff, 0xff];

/// Opaque black.
pub const BLACK: Bgra = [0x00, 0x00, 0x00, 0xff];

/// A mutable BGRA drawing surface with fixed dimensions.
///
/// The dimensions never change over the life of the canvas; a recording
/// sizes its frames from them once at start.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Mutex<Vec<u8>>,
}

impl Canvas {
    /// Create a canvas of the given size, filled opaque white.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "canvas dimensions must be nonzero");

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&WHITE);
        }

        Self {
            width,
            height,
            pixels: Mutex::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of one full frame of this canvas in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Set a single pixel. Coordinates outside the canvas are ignored,
    /// so stroke drawing does not need to clip against the edges.
    pub fn set_pixel(&self, x: i32, y: i32, color: Bgra) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }

        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.lock()[offset..offset + 4].copy_from_slice(&color);
    }

    /// Read back a single pixel.
    ///
    /// Panics if the coordinates are outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Bgra {
        assert!(x < self.width && y < self.height, "pixel out of bounds");

        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let pixels = self.lock();
        [
            pixels[offset],
            pixels[offset + 1],
            pixels[offset + 2],
            pixels[offset + 3],
        ]
    }

    /// Flood the whole canvas with one color.
    pub fn fill(&self, color: Bgra) {
        let mut pixels = self.lock();
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Draw a one-pixel line between two points (Bresenham). Strokes are
    /// recorded as line segments between successive mouse samples.
    pub fn draw_line(&self, x0: i32, y0: i32, x1: i32, y1: i32, color: Bgra) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };

        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Snapshot the canvas into `dest`.
    ///
    /// `dest` must be exactly `width * height * 4` bytes; anything else is
    /// a caller bug and panics. With `flip` false, row `i` of the canvas
    /// lands in row `i` of `dest` (top-down). With `flip` true, row `i`
    /// lands in row `height - 1 - i`, the bottom-up order expected by
    /// codecs that store native DIB rows.
    ///
    /// The pixel lock is held only while copying; the canvas itself is
    /// never modified.
    pub fn capture_into(&self, dest: &mut [u8], flip: bool) {
        assert_eq!(
            dest.len(),
            self.size_in_bytes(),
            "capture buffer size must match canvas size"
        );

        let stride = self.width as usize * 4;
        let pixels = self.lock();

        if flip {
            for (from_top, dest_row) in dest.chunks_exact_mut(stride).rev().enumerate() {
                let start = from_top * stride;
                dest_row.copy_from_slice(&pixels[start..start + stride]);
            }
        } else {
            dest.copy_from_slice(&pixels);
        }
    }

    // A panic while drawing poisons the mutex but cannot leave the pixel
    // bytes themselves invalid, so a poisoned lock still counts as
    // acquired.
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.pixels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_white() {
        let canvas = Canvas::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), WHITE);
            }
        }
    }

    #[test]
    fn test_set_and_read_pixel() {
        let canvas = Canvas::new(8, 8);
        canvas.set_pixel(3, 5, BLACK);
        assert_eq!(canvas.pixel(3, 5), BLACK);
        assert_eq!(canvas.pixel(5, 3), WHITE);
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let canvas = Canvas::new(4, 4);
        canvas.set_pixel(-1, 0, BLACK);
        canvas.set_pixel(0, 4, BLACK);
        canvas.set_pixel(100, 100, BLACK);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(canvas.pixel(x, y), WHITE);
            }
        }
    }

    #[test]
    fn test_draw_line_endpoints() {
        let canvas = Canvas::new(16, 16);
        canvas.draw_line(2, 2, 13, 9, BLACK);
        assert_eq!(canvas.pixel(2, 2), BLACK);
        assert_eq!(canvas.pixel(13, 9), BLACK);
    }

    #[test]
    fn test_capture_top_down() {
        let canvas = Canvas::new(2, 3);
        canvas.set_pixel(0, 0, [1, 2, 3, 4]);
        canvas.set_pixel(1, 2, [5, 6, 7, 8]);

        let mut dest = vec![0u8; canvas.size_in_bytes()];
        canvas.capture_into(&mut dest, false);

        assert_eq!(&dest[0..4], &[1, 2, 3, 4]);
        assert_eq!(&dest[(2 * 2 + 1) * 4..(2 * 2 + 1) * 4 + 4], &[5, 6, 7, 8]);
    }

    #[test]
    fn test_capture_flipped_reverses_rows() {
        let height = 3u32;
        let canvas = Canvas::new(2, height);
        // Tag each row with its index in the blue channel.
        for y in 0..height {
            for x in 0..2 {
                canvas.set_pixel(x as i32, y as i32, [y as u8, 0, 0, 0xff]);
            }
        }

        let mut dest = vec![0u8; canvas.size_in_bytes()];
        canvas.capture_into(&mut dest, true);

        let stride = 2 * 4;
        for r in 0..height as usize {
            let row = &dest[r * stride..(r + 1) * stride];
            assert_eq!(
                row[0],
                (height as usize - 1 - r) as u8,
                "flipped row {} should hold source row {}",
                r,
                height as usize - 1 - r
            );
        }
    }

    #[test]
    #[should_panic(expected = "capture buffer size")]
    fn test_capture_rejects_wrong_buffer_size() {
        let canvas = Canvas::new(4, 4);
        let mut dest = vec![0u8; 7];
        canvas.capture_into(&mut dest, false);
    }
}
