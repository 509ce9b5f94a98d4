//! Per-codec frame encoding

use std::borrow::Cow;

use openh264::encoder::{Encoder, FrameType};
use openh264::formats::YUVBuffer;

use super::codec::Codec;
use crate::avi::{fourcc, VideoStreamFormat, BI_RGB};
use crate::errors::RecordError;

const JPEG_QUALITY: u8 = 100;

/// One encoded frame, ready for the container.
pub struct EncodedFrame<'a> {
    /// Frame bytes: borrowed for the passthrough codecs, owned when
    /// compression produced new data.
    pub data: Cow<'a, [u8]>,
    /// Whether the frame decodes without reference to earlier frames.
    pub is_keyframe: bool,
}

/// Encodes captured BGRA frames for one recording session.
///
/// Constructed once per recording, exhaustively over the closed codec
/// set. Construction fails for a codec whose backend is missing, so a
/// bad selection is caught before any container bytes are written.
pub struct FrameEncoder {
    backend: Backend,
    width: u32,
    height: u32,
}

enum Backend {
    Raw,
    Uncompressed,
    MotionJpeg,
    H264(Encoder),
}

impl FrameEncoder {
    pub fn new(codec: Codec, width: u32, height: u32) -> Result<Self, RecordError> {
        let backend = match codec {
            Codec::Raw => Backend::Raw,
            Codec::Uncompressed => Backend::Uncompressed,
            Codec::MotionJpeg => Backend::MotionJpeg,
            Codec::H264 => {
                let encoder = Encoder::new().map_err(|e| {
                    RecordError::EncodingError(format!("Failed to create H.264 encoder: {}", e))
                })?;
                Backend::H264(encoder)
            }
        };

        Ok(Self {
            backend,
            width,
            height,
        })
    }

    /// Stream parameters the container writer needs for this codec.
    pub fn stream_format(&self) -> VideoStreamFormat {
        let (handler, compression, bits_per_pixel, top_down) = match self.backend {
            // Bottom-up DIB rows, flipped upstream during capture.
            Backend::Raw => (*b"DIB ", BI_RGB, 32, false),
            // Top-down rows stored as captured, no flip anywhere.
            Backend::Uncompressed => (*b"DIB ", BI_RGB, 32, true),
            Backend::MotionJpeg => (*b"MJPG", fourcc(*b"MJPG"), 24, false),
            Backend::H264(_) => (*b"H264", fourcc(*b"H264"), 24, false),
        };

        VideoStreamFormat {
            width: self.width,
            height: self.height,
            handler,
            compression,
            bits_per_pixel,
            top_down,
        }
    }

    /// Encode one captured frame of `width * height * 4` BGRA bytes, in
    /// whatever row order capture produced for this codec.
    pub fn encode<'a>(&mut self, bgra: &'a [u8]) -> Result<EncodedFrame<'a>, RecordError> {
        let expected = (self.width * self.height * 4) as usize;
        if bgra.len() != expected {
            return Err(RecordError::EncodingError(format!(
                "Invalid frame size: expected {} bytes, got {}",
                expected,
                bgra.len()
            )));
        }

        match &mut self.backend {
            Backend::Raw | Backend::Uncompressed => Ok(EncodedFrame {
                data: Cow::Borrowed(bgra),
                is_keyframe: true,
            }),
            Backend::MotionJpeg => {
                let rgb = bgra_to_rgb(bgra);
                let mut jpeg = Vec::new();
                {
                    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                        &mut jpeg,
                        JPEG_QUALITY,
                    );
                    encoder
                        .encode(&rgb, self.width, self.height, image::ExtendedColorType::Rgb8)
                        .map_err(|e| {
                            RecordError::EncodingError(format!("JPEG encoding failed: {}", e))
                        })?;
                }
                Ok(EncodedFrame {
                    data: Cow::Owned(jpeg),
                    is_keyframe: true,
                })
            }
            Backend::H264(encoder) => {
                let yuv = bgra_to_yuv420(bgra, self.width, self.height);
                let buffer =
                    YUVBuffer::from_vec(yuv, self.width as usize, self.height as usize);
                let bitstream = encoder.encode(&buffer).map_err(|e| {
                    RecordError::EncodingError(format!("H.264 encoding failed: {}", e))
                })?;

                let is_keyframe = matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I);

                Ok(EncodedFrame {
                    data: Cow::Owned(bitstream.to_vec()),
                    is_keyframe,
                })
            }
        }
    }
}

fn bgra_to_rgb(bgra: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(bgra.len() / 4 * 3);
    for px in bgra.chunks_exact(4) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    rgb
}

/// Convert packed BGRA to planar YUV 4:2:0 (BT.601).
fn bgra_to_yuv420(bgra: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;

    let y_size = w * h;
    let uv_size = (w / 2) * (h / 2);
    let mut yuv = vec![0u8; y_size + uv_size * 2];

    let (y_plane, uv_planes) = yuv.split_at_mut(y_size);
    let (u_plane, v_plane) = uv_planes.split_at_mut(uv_size);

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) * 4;
            let b = bgra[idx] as i32;
            let g = bgra[idx + 1] as i32;
            let r = bgra[idx + 2] as i32;

            let y_val = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
            y_plane[y * w + x] = y_val.clamp(0, 255) as u8;

            // Subsample U and V over 2x2 blocks.
            if y % 2 == 0 && x % 2 == 0 {
                let uv_idx = (y / 2) * (w / 2) + (x / 2);
                let u_val = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
                let v_val = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
                u_plane[uv_idx] = u_val.clamp(0, 255) as u8;
                v_plane[uv_idx] = v_val.clamp(0, 255) as u8;
            }
        }
    }

    yuv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_to_yuv420_size() {
        let width = 64u32;
        let height = 48u32;
        let bgra = vec![128u8; (width * height * 4) as usize];

        let yuv = bgra_to_yuv420(&bgra, width, height);

        // YUV420: Y + U + V = w*h + w*h/4 + w*h/4 = w*h * 1.5
        let expected = (width * height * 3 / 2) as usize;
        assert_eq!(yuv.len(), expected);
    }

    #[test]
    fn test_bgra_to_rgb_reorders_channels() {
        let bgra = [10u8, 20, 30, 255, 40, 50, 60, 255];
        let rgb = bgra_to_rgb(&bgra);
        assert_eq!(rgb, vec![30, 20, 10, 60, 50, 40]);
    }

    #[test]
    fn test_passthrough_borrows_the_capture_buffer() {
        let mut encoder = FrameEncoder::new(Codec::Raw, 4, 4).unwrap();
        let bgra = vec![0xffu8; 4 * 4 * 4];

        let frame = encoder.encode(&bgra).unwrap();
        assert!(matches!(frame.data, Cow::Borrowed(_)));
        assert!(frame.is_keyframe);
        assert_eq!(frame.data.as_ref(), bgra.as_slice());
    }

    #[test]
    fn test_motion_jpeg_produces_jpeg_magic() {
        let mut encoder = FrameEncoder::new(Codec::MotionJpeg, 16, 16).unwrap();
        let bgra = vec![0x80u8; 16 * 16 * 4];

        let frame = encoder.encode(&bgra).unwrap();
        assert!(frame.is_keyframe);
        assert!(
            frame.data.starts_with(&[0xff, 0xd8]),
            "JPEG frames start with SOI, got: {:02x?}",
            &frame.data[..frame.data.len().min(4)]
        );
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let mut encoder = FrameEncoder::new(Codec::Uncompressed, 8, 8).unwrap();
        let result = encoder.encode(&[0u8; 16]);
        assert!(matches!(result, Err(RecordError::EncodingError(_))));
    }

    #[test]
    fn test_stream_formats_per_codec() {
        let raw = FrameEncoder::new(Codec::Raw, 8, 8).unwrap().stream_format();
        assert_eq!(raw.compression, BI_RGB);
        assert!(!raw.top_down);

        let uncompressed = FrameEncoder::new(Codec::Uncompressed, 8, 8)
            .unwrap()
            .stream_format();
        assert_eq!(uncompressed.compression, BI_RGB);
        assert!(uncompressed.top_down);

        let mjpeg = FrameEncoder::new(Codec::MotionJpeg, 8, 8)
            .unwrap()
            .stream_format();
        assert_eq!(mjpeg.handler, *b"MJPG");
        assert_eq!(mjpeg.bits_per_pixel, 24);
    }
}
