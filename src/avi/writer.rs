//! Single-stream AVI writer over any seekable byte sink

use std::io::{self, Seek, SeekFrom, Write};

/// The main header advertises an `idx1` index at the end of the file.
pub const AVIF_HASINDEX: u32 = 0x0000_0010;

/// Index flag marking a chunk that can be decoded without predecessors.
pub const AVIIF_KEYFRAME: u32 = 0x0000_0010;

/// `biCompression` value for uncompressed RGB rows.
pub const BI_RGB: u32 = 0;

/// Four-character code, as written to the file.
pub type FourCc = [u8; 4];

/// Interpret a four-character code as the little-endian integer AVI
/// headers store it as (for `biCompression`).
pub const fn fourcc(code: FourCc) -> u32 {
    u32::from_le_bytes(code)
}

/// Playback rate as the exact rational `rate / scale`.
///
/// Header fields carry the two integers separately, so a rate derived
/// from a millisecond interval stays exact over any recording length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub rate: u32,
    pub scale: u32,
}

impl FrameRate {
    /// Rate for one frame every `interval_ms` milliseconds: `1000 / interval_ms`
    /// frames per second, kept as a rational.
    pub fn from_interval_ms(interval_ms: u32) -> Self {
        assert!(interval_ms > 0, "capture interval must be nonzero");
        Self {
            rate: 1000,
            scale: interval_ms,
        }
    }

    /// Frame duration in microseconds (`dwMicroSecPerFrame`).
    pub fn micros_per_frame(&self) -> u32 {
        (1_000_000u64 * self.scale as u64 / self.rate as u64) as u32
    }

    /// Frames per second, for display only.
    pub fn as_f64(&self) -> f64 {
        self.rate as f64 / self.scale as f64
    }
}

/// Parameters of the video stream as they appear in the `strh` and
/// `strf` header chunks.
#[derive(Debug, Clone, Copy)]
pub struct VideoStreamFormat {
    pub width: u32,
    pub height: u32,
    /// Codec identifier for `strh.fccHandler`.
    pub handler: FourCc,
    /// `strf.biCompression`: [`BI_RGB`] or a codec code via [`fourcc`].
    pub compression: u32,
    pub bits_per_pixel: u16,
    /// Store rows top-down (negative `biHeight`) instead of the native
    /// bottom-up DIB order.
    pub top_down: bool,
}

struct IndexEntry {
    flags: u32,
    offset: u32,
    size: u32,
}

/// Writes one video stream into an AVI container.
///
/// Construction writes the RIFF and header lists and opens the `movi`
/// list; [`write_frame`](Self::write_frame) appends frame chunks in
/// order; [`close`](Self::close) writes the `idx1` index, patches the
/// sizes and frame counts the headers could not know up front, and
/// returns the sink. Consuming `self` on close makes writing after close
/// (or closing twice) impossible.
///
/// The declared frame rate is constant; the writer assigns no per-frame
/// timestamps.
pub struct AviWriter<W: Write + Seek> {
    sink: W,
    chunk_id: FourCc,
    frame_count: u32,
    max_chunk_size: u32,
    index: Vec<IndexEntry>,
    movi_fourcc_pos: u64,
    riff_size_pos: u64,
    total_frames_pos: u64,
    avih_buffer_pos: u64,
    stream_length_pos: u64,
    strh_buffer_pos: u64,
    movi_size_pos: u64,
}

// Fixed header geometry: the hdrl list holds one avih chunk and one strl
// list with a strh + strf pair.
const AVIH_SIZE: u32 = 56;
const STRH_SIZE: u32 = 56;
const STRF_SIZE: u32 = 40;
const STRL_SIZE: u32 = 4 + (8 + STRH_SIZE) + (8 + STRF_SIZE);
const HDRL_SIZE: u32 = 4 + (8 + AVIH_SIZE) + (8 + STRL_SIZE);

impl<W: Write + Seek> AviWriter<W> {
    /// Write the container headers for a single video stream and prepare
    /// to accept frames.
    pub fn create(mut sink: W, format: VideoStreamFormat, rate: FrameRate) -> io::Result<Self> {
        sink.write_all(b"RIFF")?;
        let riff_size_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // patched on close
        sink.write_all(b"AVI ")?;

        sink.write_all(b"LIST")?;
        write_u32(&mut sink, HDRL_SIZE)?;
        sink.write_all(b"hdrl")?;

        sink.write_all(b"avih")?;
        write_u32(&mut sink, AVIH_SIZE)?;
        write_u32(&mut sink, rate.micros_per_frame())?;
        write_u32(&mut sink, 0)?; // dwMaxBytesPerSec
        write_u32(&mut sink, 0)?; // dwPaddingGranularity
        write_u32(&mut sink, AVIF_HASINDEX)?;
        let total_frames_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // dwTotalFrames, patched on close
        write_u32(&mut sink, 0)?; // dwInitialFrames
        write_u32(&mut sink, 1)?; // dwStreams
        let avih_buffer_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // dwSuggestedBufferSize, patched on close
        write_u32(&mut sink, format.width)?;
        write_u32(&mut sink, format.height)?;
        for _ in 0..4 {
            write_u32(&mut sink, 0)?; // dwReserved
        }

        sink.write_all(b"LIST")?;
        write_u32(&mut sink, STRL_SIZE)?;
        sink.write_all(b"strl")?;

        sink.write_all(b"strh")?;
        write_u32(&mut sink, STRH_SIZE)?;
        sink.write_all(b"vids")?;
        sink.write_all(&format.handler)?;
        write_u32(&mut sink, 0)?; // dwFlags
        write_u16(&mut sink, 0)?; // wPriority
        write_u16(&mut sink, 0)?; // wLanguage
        write_u32(&mut sink, 0)?; // dwInitialFrames
        write_u32(&mut sink, rate.scale)?;
        write_u32(&mut sink, rate.rate)?;
        write_u32(&mut sink, 0)?; // dwStart
        let stream_length_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // dwLength, patched on close
        let strh_buffer_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // dwSuggestedBufferSize, patched on close
        write_u32(&mut sink, u32::MAX)?; // dwQuality: driver default
        write_u32(&mut sink, 0)?; // dwSampleSize
        // rcFrame
        write_u16(&mut sink, 0)?;
        write_u16(&mut sink, 0)?;
        write_u16(&mut sink, format.width as u16)?;
        write_u16(&mut sink, format.height as u16)?;

        sink.write_all(b"strf")?;
        write_u32(&mut sink, STRF_SIZE)?;
        write_u32(&mut sink, STRF_SIZE)?; // biSize
        write_i32(&mut sink, format.width as i32)?;
        let bi_height = if format.top_down {
            -(format.height as i32)
        } else {
            format.height as i32
        };
        write_i32(&mut sink, bi_height)?;
        write_u16(&mut sink, 1)?; // biPlanes
        write_u16(&mut sink, format.bits_per_pixel)?;
        write_u32(&mut sink, format.compression)?;
        let size_image =
            format.width * format.height * (format.bits_per_pixel as u32 / 8);
        write_u32(&mut sink, size_image)?;
        write_i32(&mut sink, 0)?; // biXPelsPerMeter
        write_i32(&mut sink, 0)?; // biYPelsPerMeter
        write_u32(&mut sink, 0)?; // biClrUsed
        write_u32(&mut sink, 0)?; // biClrImportant

        sink.write_all(b"LIST")?;
        let movi_size_pos = sink.stream_position()?;
        write_u32(&mut sink, 0)?; // patched on close
        let movi_fourcc_pos = sink.stream_position()?;
        sink.write_all(b"movi")?;

        let chunk_id = if format.compression == BI_RGB {
            *b"00db"
        } else {
            *b"00dc"
        };

        Ok(Self {
            sink,
            chunk_id,
            frame_count: 0,
            max_chunk_size: 0,
            index: Vec::new(),
            movi_fourcc_pos,
            riff_size_pos,
            total_frames_pos,
            avih_buffer_pos,
            stream_length_pos,
            strh_buffer_pos,
            movi_size_pos,
        })
    }

    /// Append one encoded frame as a `movi` chunk, in order.
    pub fn write_frame(&mut self, data: &[u8], keyframe: bool) -> io::Result<()> {
        let chunk_pos = self.sink.stream_position()?;

        self.sink.write_all(&self.chunk_id)?;
        write_u32(&mut self.sink, data.len() as u32)?;
        self.sink.write_all(data)?;
        if data.len() % 2 == 1 {
            self.sink.write_all(&[0])?; // RIFF chunks are word aligned
        }

        self.index.push(IndexEntry {
            flags: if keyframe { AVIIF_KEYFRAME } else { 0 },
            offset: (chunk_pos - self.movi_fourcc_pos) as u32,
            size: data.len() as u32,
        });
        self.frame_count += 1;
        self.max_chunk_size = self.max_chunk_size.max(data.len() as u32);

        Ok(())
    }

    /// Frames written so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Write the index, patch the header sizes and counts, flush, and
    /// hand the sink back.
    pub fn close(mut self) -> io::Result<W> {
        let movi_end = self.sink.stream_position()?;

        self.sink.write_all(b"idx1")?;
        write_u32(&mut self.sink, (self.index.len() * 16) as u32)?;
        for entry in &self.index {
            self.sink.write_all(&self.chunk_id)?;
            write_u32(&mut self.sink, entry.flags)?;
            write_u32(&mut self.sink, entry.offset)?;
            write_u32(&mut self.sink, entry.size)?;
        }
        let file_end = self.sink.stream_position()?;

        self.patch(self.riff_size_pos, (file_end - 8) as u32)?;
        self.patch(self.total_frames_pos, self.frame_count)?;
        self.patch(self.avih_buffer_pos, self.max_chunk_size)?;
        self.patch(self.stream_length_pos, self.frame_count)?;
        self.patch(self.strh_buffer_pos, self.max_chunk_size)?;
        self.patch(
            self.movi_size_pos,
            (movi_end - self.movi_fourcc_pos) as u32,
        )?;

        self.sink.seek(SeekFrom::Start(file_end))?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn patch(&mut self, pos: u64, value: u32) -> io::Result<()> {
        self.sink.seek(SeekFrom::Start(pos))?;
        write_u32(&mut self.sink, value)
    }
}

fn write_u32<W: Write>(sink: &mut W, value: u32) -> io::Result<()> {
    sink.write_all(&value.to_le_bytes())
}

fn write_i32<W: Write>(sink: &mut W, value: i32) -> io::Result<()> {
    sink.write_all(&value.to_le_bytes())
}

fn write_u16<W: Write>(sink: &mut W, value: u16) -> io::Result<()> {
    sink.write_all(&value.to_le_bytes())
}
