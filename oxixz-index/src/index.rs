//! In-memory XZ Index.
//!
//! An Index field lists, for every Block of a Stream, its Unpadded Size and
//! Uncompressed Size. [`Index`] holds the records of one or more Streams in
//! file order together with the per-Stream metadata that only the
//! surrounding records know about (Stream Flags and Stream Padding), and
//! answers the aggregate queries over the whole file.

use crate::flags::{CheckType, HEADER_SIZE_U64, PADDING_ALIGNMENT, StreamFlags};
use crate::vli::{VLI_MAX, vli_size};
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use serde::Serialize;

/// Smallest valid Unpadded Size (Block Header of 4 bytes + 1 byte of data).
pub const UNPADDED_SIZE_MIN: u64 = 5;

/// Largest valid Unpadded Size.
pub const UNPADDED_SIZE_MAX: u64 = VLI_MAX & !3;

/// Rough memory cost of one Stream in an [`Index`].
const STREAM_MEMUSAGE: u64 = 192;

/// Rough memory cost of one Block record.
const RECORD_MEMUSAGE: u64 = 16;

/// Fixed overhead of an [`Index`].
const INDEX_BASE_MEMUSAGE: u64 = 128;

/// Round up to the next multiple of four.
#[inline]
pub(crate) fn round_up4(value: u64) -> u64 {
    (value + 3) & !3
}

/// One Index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockRecord {
    /// Block Header + Compressed Data + Check, without Block Padding.
    pub unpadded_size: u64,
    /// Size of the Block's data after decompression.
    pub uncompressed_size: u64,
}

impl BlockRecord {
    /// Size the Block occupies in the file, Block Padding included.
    pub fn total_size(&self) -> u64 {
        round_up4(self.unpadded_size)
    }
}

/// The Index of a single Stream plus its Stream-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamIndex {
    flags: Option<StreamFlags>,
    padding: u64,
    records: Vec<BlockRecord>,
    blocks_size: u64,
    uncompressed_size: u64,
    records_size: u64,
}

impl StreamIndex {
    /// Create an empty Stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a Block record.
    pub fn push(&mut self, record: BlockRecord) -> Result<()> {
        if !(UNPADDED_SIZE_MIN..=UNPADDED_SIZE_MAX).contains(&record.unpadded_size)
            || record.uncompressed_size > VLI_MAX
        {
            return Err(XzError::codec(CodecErrorKind::Program));
        }

        let blocks_size = self
            .blocks_size
            .checked_add(record.total_size())
            .filter(|&size| size <= VLI_MAX);
        let uncompressed_size = self
            .uncompressed_size
            .checked_add(record.uncompressed_size)
            .filter(|&size| size <= VLI_MAX);

        match (blocks_size, uncompressed_size) {
            (Some(blocks_size), Some(uncompressed_size)) => {
                self.blocks_size = blocks_size;
                self.uncompressed_size = uncompressed_size;
                self.records_size +=
                    (vli_size(record.unpadded_size) + vli_size(record.uncompressed_size)) as u64;
                self.records.push(record);
                Ok(())
            }
            _ => Err(XzError::corrupt(0, "Index sizes overflow")),
        }
    }

    /// Block records in file order.
    pub fn records(&self) -> &[BlockRecord] {
        &self.records
    }

    /// Stream Flags attached after the Stream Footer was verified.
    pub fn flags(&self) -> Option<StreamFlags> {
        self.flags
    }

    /// Integrity check of this Stream, if known.
    pub fn check(&self) -> Option<CheckType> {
        self.flags.map(|flags| flags.check)
    }

    /// Stream Padding following this Stream.
    pub fn padding(&self) -> u64 {
        self.padding
    }

    /// Number of Blocks.
    pub fn block_count(&self) -> u64 {
        self.records.len() as u64
    }

    /// Total size of all Blocks, Block Padding included.
    pub fn blocks_size(&self) -> u64 {
        self.blocks_size
    }

    /// Total uncompressed size of all Blocks.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Size of the encoded Index field.
    pub fn index_size(&self) -> u64 {
        // Index Indicator + Number of Records + records + padding + CRC32
        let unpadded = 1 + vli_size(self.block_count()) as u64 + self.records_size;
        round_up4(unpadded) + 4
    }

    /// Size of the Stream from Stream Header to Stream Footer inclusive.
    pub fn stream_size(&self) -> u64 {
        2 * HEADER_SIZE_U64 + self.blocks_size + self.index_size()
    }
}

/// Summary of one Stream within a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    /// Stream number (1-based).
    pub number: u64,
    /// Number of Blocks in the Stream.
    pub block_count: u64,
    /// File offset of the Stream Header.
    pub compressed_offset: u64,
    /// Uncompressed offset of the Stream's first byte.
    pub uncompressed_offset: u64,
    /// Stream Header to Stream Footer inclusive.
    pub compressed_size: u64,
    /// Uncompressed size.
    pub uncompressed_size: u64,
    /// Stream Padding following the Stream.
    pub padding: u64,
    /// Integrity check, if known.
    pub check: Option<CheckType>,
}

/// Summary of one Block within a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    /// Stream the Block belongs to (1-based).
    pub stream_number: u64,
    /// Block number within its Stream (1-based).
    pub number_in_stream: u64,
    /// Block number within the file (1-based).
    pub number_in_file: u64,
    /// File offset of the Block Header.
    pub compressed_file_offset: u64,
    /// Uncompressed offset of the Block's first byte.
    pub uncompressed_file_offset: u64,
    /// Size including Block Padding.
    pub total_size: u64,
    /// Size excluding Block Padding.
    pub unpadded_size: u64,
    /// Uncompressed size.
    pub uncompressed_size: u64,
}

/// Index of one or more Streams in file order.
///
/// Built by decoding a single Index field (see
/// [`IndexDecoder`](crate::decoder::IndexDecoder)) and concatenating
/// the results with [`Index::concat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    streams: Vec<StreamIndex>,
}

impl Index {
    /// Create an Index holding a single Stream.
    pub fn from_stream(stream: StreamIndex) -> Self {
        Self {
            streams: vec![stream],
        }
    }

    /// Estimate memory needed for an Index of the given shape.
    pub fn memusage(streams: u64, blocks: u64) -> u64 {
        INDEX_BASE_MEMUSAGE
            .saturating_add(streams.saturating_mul(STREAM_MEMUSAGE))
            .saturating_add(blocks.saturating_mul(RECORD_MEMUSAGE))
    }

    /// Estimated memory held by this Index.
    pub fn memory_usage(&self) -> u64 {
        Self::memusage(self.stream_count(), self.block_count())
    }

    /// Streams in file order.
    pub fn streams(&self) -> &[StreamIndex] {
        &self.streams
    }

    /// Number of Streams.
    pub fn stream_count(&self) -> u64 {
        self.streams.len() as u64
    }

    /// Number of Blocks across all Streams.
    pub fn block_count(&self) -> u64 {
        self.streams.iter().map(StreamIndex::block_count).sum()
    }

    /// Size of the whole file: every Stream plus its Stream Padding.
    pub fn file_size(&self) -> u64 {
        self.streams
            .iter()
            .map(|s| s.stream_size() + s.padding())
            .sum()
    }

    /// Total uncompressed size.
    pub fn uncompressed_size(&self) -> u64 {
        self.streams.iter().map(StreamIndex::uncompressed_size).sum()
    }

    /// Total size of all Blocks of all Streams.
    pub fn total_size(&self) -> u64 {
        self.streams.iter().map(StreamIndex::blocks_size).sum()
    }

    /// Total Stream Padding.
    pub fn stream_padding(&self) -> u64 {
        self.streams.iter().map(StreamIndex::padding).sum()
    }

    /// Bitmask of the Check IDs used (bit N set for Check ID N).
    pub fn checks(&self) -> u32 {
        self.streams
            .iter()
            .filter_map(StreamIndex::check)
            .fold(0, |mask, check| mask | (1 << check.id()))
    }

    /// Attach verified Stream Flags to the last Stream.
    pub fn set_stream_flags(&mut self, flags: StreamFlags) -> Result<()> {
        let last = self
            .streams
            .last_mut()
            .ok_or_else(|| XzError::codec(CodecErrorKind::Program))?;
        last.flags = Some(flags);
        Ok(())
    }

    /// Record the Stream Padding that follows the last Stream.
    pub fn set_stream_padding(&mut self, padding: u64) -> Result<()> {
        if padding % PADDING_ALIGNMENT != 0 || padding > VLI_MAX {
            return Err(XzError::codec(CodecErrorKind::Program));
        }

        let others = self.file_size() - self.streams.last().map_or(0, |s| s.padding());
        if others.checked_add(padding).is_none_or(|size| size > VLI_MAX) {
            return Err(XzError::codec(CodecErrorKind::Data));
        }

        let last = self
            .streams
            .last_mut()
            .ok_or_else(|| XzError::codec(CodecErrorKind::Program))?;
        last.padding = padding;
        Ok(())
    }

    /// Concatenate two Indexes: `prefix` comes earlier in the file than `suffix`.
    ///
    /// Both are consumed. Fails if the combined file or uncompressed size
    /// would no longer fit a multibyte integer.
    pub fn concat(prefix: Index, suffix: Index) -> Result<Index> {
        let file_size = prefix.file_size().checked_add(suffix.file_size());
        let uncompressed = prefix
            .uncompressed_size()
            .checked_add(suffix.uncompressed_size());

        match (file_size, uncompressed) {
            (Some(f), Some(u)) if f <= VLI_MAX && u <= VLI_MAX => {}
            _ => return Err(XzError::corrupt(0, "Combined Index sizes overflow")),
        }

        let mut streams = prefix.streams;
        streams.extend(suffix.streams);
        Ok(Index { streams })
    }

    /// Per-Stream summaries with file offsets.
    pub fn stream_infos(&self) -> Vec<StreamInfo> {
        let mut compressed_offset = 0;
        let mut uncompressed_offset = 0;

        self.streams
            .iter()
            .enumerate()
            .map(|(i, stream)| {
                let info = StreamInfo {
                    number: i as u64 + 1,
                    block_count: stream.block_count(),
                    compressed_offset,
                    uncompressed_offset,
                    compressed_size: stream.stream_size(),
                    uncompressed_size: stream.uncompressed_size(),
                    padding: stream.padding(),
                    check: stream.check(),
                };
                compressed_offset += stream.stream_size() + stream.padding();
                uncompressed_offset += stream.uncompressed_size();
                info
            })
            .collect()
    }

    /// Per-Block summaries with file offsets.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let mut blocks = Vec::with_capacity(self.block_count() as usize);
        let mut number_in_file = 0;

        for (stream, info) in self.streams.iter().zip(self.stream_infos()) {
            let mut compressed = info.compressed_offset + HEADER_SIZE_U64;
            let mut uncompressed = info.uncompressed_offset;

            for (i, record) in stream.records().iter().enumerate() {
                number_in_file += 1;
                blocks.push(BlockInfo {
                    stream_number: info.number,
                    number_in_stream: i as u64 + 1,
                    number_in_file,
                    compressed_file_offset: compressed,
                    uncompressed_file_offset: uncompressed,
                    total_size: record.total_size(),
                    unpadded_size: record.unpadded_size,
                    uncompressed_size: record.uncompressed_size,
                });
                compressed += record.total_size();
                uncompressed += record.uncompressed_size;
            }
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(records: &[(u64, u64)]) -> StreamIndex {
        let mut s = StreamIndex::new();
        for &(unpadded_size, uncompressed_size) in records {
            s.push(BlockRecord {
                unpadded_size,
                uncompressed_size,
            })
            .unwrap();
        }
        s
    }

    #[test]
    fn test_empty_stream_sizes() {
        let s = StreamIndex::new();
        // Indicator + count (1 byte) padded to 4, plus CRC32.
        assert_eq!(s.index_size(), 8);
        assert_eq!(s.stream_size(), 32);
        assert_eq!(s.block_count(), 0);
    }

    #[test]
    fn test_stream_sizes() {
        let s = stream(&[(61, 100), (1029, 4096)]);
        assert_eq!(s.blocks_size(), 64 + 1032);
        assert_eq!(s.uncompressed_size(), 4196);
        // 1 + 1 + (1 + 1) + (2 + 2) = 8 -> 8, + 4
        assert_eq!(s.index_size(), 12);
        assert_eq!(s.stream_size(), 24 + 1096 + 12);
    }

    #[test]
    fn test_push_rejects_invalid_sizes() {
        let mut s = StreamIndex::new();
        assert!(
            s.push(BlockRecord {
                unpadded_size: 4,
                uncompressed_size: 0
            })
            .is_err()
        );
        assert!(
            s.push(BlockRecord {
                unpadded_size: UNPADDED_SIZE_MAX + 1,
                uncompressed_size: 0
            })
            .is_err()
        );
        assert_eq!(s.block_count(), 0);
    }

    #[test]
    fn test_concat_keeps_file_order() {
        let mut first = Index::from_stream(stream(&[(13, 10)]));
        first.set_stream_padding(8).unwrap();
        first.set_stream_flags(StreamFlags::new(CheckType::Crc32)).unwrap();
        let mut second = Index::from_stream(stream(&[(21, 20), (9, 5)]));
        second.set_stream_flags(StreamFlags::new(CheckType::Sha256)).unwrap();

        let combined = Index::concat(first.clone(), second.clone()).unwrap();
        assert_eq!(combined.stream_count(), 2);
        assert_eq!(combined.block_count(), 3);
        assert_eq!(combined.uncompressed_size(), 35);
        assert_eq!(combined.file_size(), first.file_size() + second.file_size());
        assert_eq!(combined.stream_padding(), 8);
        assert_eq!(combined.checks(), (1 << 1) | (1 << 10));
        assert_eq!(combined.streams()[0].block_count(), 1);
        assert_eq!(combined.streams()[1].block_count(), 2);
    }

    #[test]
    fn test_stream_padding_must_be_aligned() {
        let mut index = Index::from_stream(StreamIndex::new());
        assert!(index.set_stream_padding(6).is_err());
        assert!(index.set_stream_padding(12).is_ok());
        assert_eq!(index.stream_padding(), 12);
        // Replacing the padding does not accumulate.
        index.set_stream_padding(4).unwrap();
        assert_eq!(index.file_size(), 32 + 4);
    }

    #[test]
    fn test_offsets() {
        let mut first = Index::from_stream(stream(&[(13, 10), (18, 7)]));
        first.set_stream_padding(4).unwrap();
        let second = Index::from_stream(stream(&[(9, 3)]));
        let combined = Index::concat(first, second).unwrap();

        let streams = combined.stream_infos();
        assert_eq!(streams[0].compressed_offset, 0);
        assert_eq!(streams[1].compressed_offset, streams[0].compressed_size + 4);
        assert_eq!(streams[1].uncompressed_offset, 17);

        let blocks = combined.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].compressed_file_offset, 12);
        assert_eq!(blocks[1].compressed_file_offset, 12 + 16);
        assert_eq!(blocks[1].uncompressed_file_offset, 10);
        assert_eq!(blocks[2].stream_number, 2);
        assert_eq!(blocks[2].number_in_stream, 1);
        assert_eq!(blocks[2].number_in_file, 3);
        assert_eq!(blocks[2].compressed_file_offset, streams[1].compressed_offset + 12);
    }

    #[test]
    fn test_memusage_grows_with_records() {
        assert!(Index::memusage(1, 1000) > Index::memusage(1, 10));
        assert_eq!(Index::memusage(u64::MAX, u64::MAX), u64::MAX);
    }
}
