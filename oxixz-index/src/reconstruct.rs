//! Reconstruct the combined Index of an .xz file by scanning it backwards.
//!
//! An .xz file is one or more Streams, each optionally followed by Stream
//! Padding:
//!
//! ```text
//! +--------+--------+-----+--------+-------+--------+---------+--------+-----
//! | Header | Block  | ... | Block  | Index | Footer | Padding | Header | ...
//! +--------+--------+-----+--------+-------+--------+---------+--------+-----
//! ```
//!
//! Only the Stream Footer says where the Index starts (Backward Size), and
//! only the Index says how large the Blocks are, so the file is walked from
//! the end: skip padding, decode the footer, decode the Index, then verify the
//! Stream Header that the Index leads back to. Streams found this way are
//! prepended to the Index collected so far.

use crate::decoder::IndexDecoder;
use crate::flags::{FORMAT_VERSION, HEADER_SIZE, HEADER_SIZE_U64, StreamFlags};
use crate::index::{Index, StreamIndex};
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use oxixz_core::traits::DecompressStatus;
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};

/// Default size of the scratch buffer used for reads.
pub const IO_BUFFER_SIZE: usize = 8192;

/// Knobs for [`reconstruct_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    memlimit: u64,
    buffer_size: usize,
}

impl ScanOptions {
    /// Defaults: no memory limit, [`IO_BUFFER_SIZE`] byte reads.
    pub fn new() -> Self {
        Self {
            memlimit: u64::MAX,
            buffer_size: IO_BUFFER_SIZE,
        }
    }

    /// Refuse Indexes whose estimated memory use exceeds `memlimit` bytes.
    pub fn with_memlimit(mut self, memlimit: u64) -> Self {
        self.memlimit = memlimit;
        self
    }

    /// Set the read buffer size.
    ///
    /// At least one header record is always buffered, and the size is
    /// rounded down to a multiple of four.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(HEADER_SIZE) & !3;
        self
    }

    /// Memory limit in bytes.
    pub fn memlimit(&self) -> u64 {
        self.memlimit
    }

    /// Read buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// What [`reconstruct`] learned about a file.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    /// Number of Streams.
    pub stream_count: u64,
    /// Number of Blocks across all Streams.
    pub block_count: u64,
    /// Size of the file as described by its Indexes.
    pub file_size: u64,
    /// Total uncompressed size.
    pub uncompressed_size: u64,
    /// Total Stream Padding.
    pub stream_padding: u64,
    /// Bitmask of the Check IDs used.
    pub checks: u32,
    #[serde(skip)]
    index: Index,
}

impl FileInfo {
    fn from_index(index: Index) -> Self {
        Self {
            stream_count: index.stream_count(),
            block_count: index.block_count(),
            file_size: index.file_size(),
            uncompressed_size: index.uncompressed_size(),
            stream_padding: index.stream_padding(),
            checks: index.checks(),
            index,
        }
    }

    /// The combined Index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Take the combined Index.
    pub fn into_index(self) -> Index {
        self.index
    }

    /// Streams in file order.
    pub fn streams(&self) -> &[StreamIndex] {
        self.index.streams()
    }

    /// Compressed size divided by uncompressed size, if anything was compressed.
    pub fn ratio(&self) -> Option<f64> {
        if self.uncompressed_size == 0 {
            None
        } else {
            Some(self.file_size as f64 / self.uncompressed_size as f64)
        }
    }
}

/// Reconstruct the combined Index of `src` with default [`ScanOptions`].
///
/// The read position of `src` is unspecified afterwards.
pub fn reconstruct<R: Read + Seek>(src: &mut R) -> Result<FileInfo> {
    reconstruct_with(src, &ScanOptions::default())
}

/// Reconstruct the combined Index of `src`.
///
/// # Errors
///
/// * `FormatError::TooSmall` if `src` cannot hold a Stream Header and Footer.
/// * `FormatError::Corrupt` for bad padding, footer, Index or header records.
/// * `FormatError::Unsupported` for an unknown format version or flags.
/// * `FormatError::Inconsistent` if a Stream Header disagrees with its footer.
/// * `XzError::Codec(MemLimit)` if the Index would exceed the memory limit.
/// * `XzError::Io` if seeking or reading fails.
pub fn reconstruct_with<R: Read + Seek>(src: &mut R, options: &ScanOptions) -> Result<FileInfo> {
    let length = src.seek(SeekFrom::End(0))?;
    if length < 2 * HEADER_SIZE_U64 {
        return Err(XzError::too_small(length));
    }

    let mut buf = vec![0u8; options.buffer_size().max(HEADER_SIZE) & !3];
    let mut combined: Option<Index> = None;
    let mut pos = length;

    while pos > 0 {
        if pos < 2 * HEADER_SIZE_U64 {
            return Err(XzError::corrupt(pos, "No room for a Stream Header and Footer"));
        }

        let (footer_start, padding) = locate_footer(src, &mut pos, &mut buf)?;

        let footer_record: [u8; HEADER_SIZE] = buf[..HEADER_SIZE]
            .try_into()
            .map_err(|_| XzError::codec(CodecErrorKind::Program))?;
        let footer =
            StreamFlags::decode_footer(&footer_record).map_err(|e| e.at_offset(footer_start))?;
        if footer.version != FORMAT_VERSION {
            return Err(XzError::unsupported(format!(
                "Unsupported format version {}",
                footer.version
            )));
        }

        let backward_size = footer
            .backward_size
            .ok_or_else(|| XzError::codec(CodecErrorKind::Program))?;
        if footer_start < backward_size + HEADER_SIZE_U64 {
            return Err(XzError::corrupt(
                footer_start,
                "Backward Size points before the start of the file",
            ));
        }
        let index_start = footer_start - backward_size;

        let mut this_index =
            decode_index(src, index_start, backward_size, options.memlimit(), &mut buf)?;

        let blocks_size = this_index.total_size();
        // Room for the Stream Header and Blocks in front of the Index.
        let room = index_start - HEADER_SIZE_U64;
        if room < blocks_size {
            return Err(XzError::corrupt(
                index_start,
                "Index describes more Blocks than fit before it",
            ));
        }
        let stream_start = room - blocks_size;

        let mut header_record = [0u8; HEADER_SIZE];
        read_exact_at(src, stream_start, &mut header_record)?;
        let header =
            StreamFlags::decode_header(&header_record).map_err(|e| e.at_offset(stream_start))?;
        if !header.flags_equal(&footer) {
            return Err(XzError::inconsistent(
                stream_start,
                "Stream Header and Footer flags do not match",
            ));
        }

        this_index.set_stream_flags(footer)?;
        this_index.set_stream_padding(padding)?;

        let merged = match combined.take() {
            Some(later) => Index::concat(this_index, later)?,
            None => this_index,
        };
        if merged.memory_usage() > options.memlimit() {
            return Err(XzError::codec(CodecErrorKind::MemLimit));
        }
        combined = Some(merged);

        pos = stream_start;
    }

    let index = combined.ok_or_else(|| XzError::codec(CodecErrorKind::Program))?;
    if index.file_size() != length {
        return Err(XzError::corrupt(0, "Index does not describe the whole file"));
    }

    Ok(FileInfo::from_index(index))
}

/// Skip Stream Padding backwards from `end` and leave the footer record at
/// the start of `buf`.
///
/// Returns the footer offset and the amount of padding skipped; `end` is
/// moved to the end of the footer.
fn locate_footer<R: Read + Seek>(
    src: &mut R,
    end: &mut u64,
    buf: &mut [u8],
) -> Result<(u64, u64)> {
    let mut padding = 0u64;

    loop {
        let window = (buf.len() as u64).min(*end) & !3;
        let start = *end - window;
        let window = window as usize;
        read_exact_at(src, start, &mut buf[..window])?;

        let mut used = window;
        while used >= 4 && buf[used - 4..used] == [0; 4] {
            used -= 4;
            padding += 4;
            *end -= 4;
            if *end < 2 * HEADER_SIZE_U64 {
                return Err(XzError::corrupt(*end, "Stream Padding without a Stream Footer"));
            }
        }

        if used >= HEADER_SIZE {
            buf.copy_within(used - HEADER_SIZE..used, 0);
            return Ok((*end - HEADER_SIZE_U64, padding));
        }
        // The footer straddles the window start, or the window was all padding.
    }
}

/// Decode the Index field of `size` bytes at `start`.
fn decode_index<R: Read + Seek>(
    src: &mut R,
    start: u64,
    size: u64,
    memlimit: u64,
    buf: &mut [u8],
) -> Result<Index> {
    let mut decoder = IndexDecoder::new(memlimit);
    let mut pos = start;
    let mut remaining = size;

    loop {
        let chunk = (buf.len() as u64).min(remaining) as usize;
        read_exact_at(src, pos, &mut buf[..chunk])?;
        pos += chunk as u64;
        remaining -= chunk as u64;

        let (consumed, status) = decoder
            .decode(&buf[..chunk])
            .map_err(|e| index_error(e, start))?;

        match status {
            DecompressStatus::Done => {
                if remaining != 0 || consumed != chunk {
                    return Err(XzError::corrupt(
                        start,
                        "Index is shorter than the Backward Size",
                    ));
                }
                break;
            }
            _ if remaining == 0 => {
                return Err(XzError::corrupt(
                    start,
                    "Index is longer than the Backward Size",
                ));
            }
            _ => {}
        }
    }

    decoder.finish().map_err(|e| index_error(e, start))
}

/// Place Index errors in the file, and report running out of Index bytes as corruption.
fn index_error(err: XzError, start: u64) -> XzError {
    match err.codec_kind() {
        Some(CodecErrorKind::Buf) => XzError::corrupt(start, "Index is truncated"),
        _ => err.at_offset(start),
    }
}

fn read_exact_at<R: Read + Seek>(src: &mut R, offset: u64, buf: &mut [u8]) -> Result<()> {
    src.seek(SeekFrom::Start(offset))?;
    src.read_exact(buf)?;
    Ok(())
}
