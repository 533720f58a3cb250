//! Incremental Index field decoder.
//!
//! ```text
//! Index Indicator (0x00) | Number of Records | Records... | Index Padding | CRC32
//! ```
//!
//! Input may be fed in arbitrary pieces; the decoder stops consuming at the
//! last byte of the CRC32 field so the caller can tell whether the field was
//! longer than the Stream Footer declared.

use crate::index::{BlockRecord, Index, StreamIndex, UNPADDED_SIZE_MAX, UNPADDED_SIZE_MIN};
use crate::vli::VliReader;
use oxixz_core::crc::Crc32;
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use oxixz_core::traits::DecompressStatus;

/// Decoder position within the Index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Indicator,
    Count,
    Unpadded,
    Uncompressed,
    Padding,
    Crc32,
    Done,
}

/// Streaming decoder for a single Index field.
#[derive(Debug)]
pub struct IndexDecoder {
    state: State,
    memlimit: u64,
    crc: Crc32,
    vli: VliReader,
    /// Bytes of the Index field consumed so far.
    pos: u64,
    /// Records still to read.
    remaining: u64,
    unpadded_size: u64,
    stored_crc: [u8; 4],
    crc_pos: usize,
    stream: StreamIndex,
}

impl IndexDecoder {
    /// Create a decoder that refuses Indexes estimated to need more than `memlimit` bytes.
    pub fn new(memlimit: u64) -> Self {
        Self {
            state: State::Indicator,
            memlimit,
            crc: Crc32::new(),
            vli: VliReader::default(),
            pos: 0,
            remaining: 0,
            unpadded_size: 0,
            stored_crc: [0; 4],
            crc_pos: 0,
            stream: StreamIndex::new(),
        }
    }

    /// Feed the next piece of the Index field.
    ///
    /// Returns the number of bytes consumed and [`DecompressStatus::NeedsInput`]
    /// or [`DecompressStatus::Done`]. Once done, no further input is consumed.
    /// Error offsets are relative to the start of the Index field.
    pub fn decode(&mut self, input: &[u8]) -> Result<(usize, DecompressStatus)> {
        let mut consumed = 0;

        while self.state != State::Done {
            // Padding ends on a four-byte boundary without consuming anything.
            if self.state == State::Padding && self.pos % 4 == 0 {
                self.state = State::Crc32;
                continue;
            }

            let Some(&byte) = input.get(consumed) else {
                return Ok((consumed, DecompressStatus::NeedsInput));
            };
            consumed += 1;

            if self.state != State::Crc32 {
                self.crc.update(&[byte]);
            }
            self.step(byte)?;
            self.pos += 1;
        }

        Ok((consumed, DecompressStatus::Done))
    }

    /// Whether the whole Index field has been decoded.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Number of Index field bytes consumed so far.
    pub fn index_size(&self) -> u64 {
        self.pos
    }

    /// Take the decoded Index. Fails unless decoding reached the end of the field.
    pub fn finish(self) -> Result<Index> {
        if self.state != State::Done {
            return Err(XzError::codec(CodecErrorKind::Buf));
        }
        Ok(Index::from_stream(self.stream))
    }

    fn step(&mut self, byte: u8) -> Result<()> {
        match self.state {
            State::Indicator => {
                if byte != 0x00 {
                    return Err(self.corrupt("Index Indicator is not zero"));
                }
                self.state = State::Count;
            }
            State::Count => {
                if let Some(count) = self.read_vli(byte)? {
                    if Index::memusage(1, count) > self.memlimit {
                        return Err(XzError::codec(CodecErrorKind::MemLimit));
                    }
                    self.remaining = count;
                    self.state = if count == 0 {
                        State::Padding
                    } else {
                        State::Unpadded
                    };
                }
            }
            State::Unpadded => {
                if let Some(size) = self.read_vli(byte)? {
                    if !(UNPADDED_SIZE_MIN..=UNPADDED_SIZE_MAX).contains(&size) {
                        return Err(self.corrupt("Unpadded Size out of range"));
                    }
                    self.unpadded_size = size;
                    self.state = State::Uncompressed;
                }
            }
            State::Uncompressed => {
                if let Some(size) = self.read_vli(byte)? {
                    let record = BlockRecord {
                        unpadded_size: self.unpadded_size,
                        uncompressed_size: size,
                    };
                    let offset = self.pos;
                    self.stream.push(record).map_err(|e| e.at_offset(offset))?;

                    self.remaining -= 1;
                    self.state = if self.remaining == 0 {
                        State::Padding
                    } else {
                        State::Unpadded
                    };
                }
            }
            State::Padding => {
                if byte != 0x00 {
                    return Err(self.corrupt("Index Padding is not zero"));
                }
            }
            State::Crc32 => {
                self.stored_crc[self.crc_pos] = byte;
                self.crc_pos += 1;
                if self.crc_pos == self.stored_crc.len() {
                    let expected = u32::from_le_bytes(self.stored_crc);
                    let computed = self.crc.value();
                    if expected != computed {
                        return Err(self.corrupt(format!(
                            "Index CRC32 mismatch: expected {:#010x}, computed {:#010x}",
                            expected, computed
                        )));
                    }
                    self.state = State::Done;
                }
            }
            State::Done => return Err(XzError::codec(CodecErrorKind::Program)),
        }

        Ok(())
    }

    fn read_vli(&mut self, byte: u8) -> Result<Option<u64>> {
        let offset = self.pos;
        self.vli.push(byte).map_err(|e| e.at_offset(offset))
    }

    fn corrupt(&self, message: impl Into<String>) -> XzError {
        XzError::corrupt(self.pos, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vli::encode_vli;
    use oxixz_core::error::FormatError;

    /// Encode an Index field for the given (unpadded, uncompressed) records.
    fn encode_index(records: &[(u64, u64)]) -> Vec<u8> {
        let mut out = vec![0x00];
        encode_vli(&mut out, records.len() as u64).unwrap();
        for &(unpadded, uncompressed) in records {
            encode_vli(&mut out, unpadded).unwrap();
            encode_vli(&mut out, uncompressed).unwrap();
        }
        while out.len() % 4 != 0 {
            out.push(0);
        }
        let crc = Crc32::compute(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }

    #[test]
    fn test_decode_empty_index() {
        let data = encode_index(&[]);
        assert_eq!(data.len(), 8);

        let mut decoder = IndexDecoder::new(u64::MAX);
        let (consumed, status) = decoder.decode(&data).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(status, DecompressStatus::Done);

        let index = decoder.finish().unwrap();
        assert_eq!(index.stream_count(), 1);
        assert_eq!(index.block_count(), 0);
    }

    #[test]
    fn test_decode_byte_by_byte() {
        let records = [(61, 100), (1029, 4096), (5, 0)];
        let data = encode_index(&records);

        let mut decoder = IndexDecoder::new(u64::MAX);
        for (i, byte) in data.iter().enumerate() {
            let (consumed, status) = decoder.decode(std::slice::from_ref(byte)).unwrap();
            assert_eq!(consumed, 1);
            if i + 1 < data.len() {
                assert_eq!(status, DecompressStatus::NeedsInput);
            } else {
                assert_eq!(status, DecompressStatus::Done);
            }
        }
        assert_eq!(decoder.index_size(), data.len() as u64);

        let index = decoder.finish().unwrap();
        assert_eq!(index.block_count(), 3);
        assert_eq!(index.uncompressed_size(), 4196);
        assert_eq!(index.streams()[0].index_size(), data.len() as u64);
    }

    #[test]
    fn test_stops_at_end_of_field() {
        let mut data = encode_index(&[(13, 10)]);
        let len = data.len();
        data.extend_from_slice(&[0xAA; 16]);

        let mut decoder = IndexDecoder::new(u64::MAX);
        let (consumed, status) = decoder.decode(&data).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(status, DecompressStatus::Done);
        assert_eq!(decoder.decode(&data[len..]).unwrap(), (0, DecompressStatus::Done));
    }

    #[test]
    fn test_finish_before_done() {
        let data = encode_index(&[(13, 10)]);
        let mut decoder = IndexDecoder::new(u64::MAX);
        decoder.decode(&data[..data.len() - 1]).unwrap();
        let err = decoder.finish().unwrap_err();
        assert_eq!(err.codec_kind(), Some(CodecErrorKind::Buf));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut data = encode_index(&[(13, 10)]);
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        let err = IndexDecoder::new(u64::MAX).decode(&data).unwrap_err();
        assert!(matches!(err.format_error(), Some(FormatError::Corrupt { .. })));
    }

    #[test]
    fn test_bad_indicator() {
        let mut data = encode_index(&[]);
        data[0] = 0x01;
        let err = IndexDecoder::new(u64::MAX).decode(&data).unwrap_err();
        assert!(matches!(
            err.format_error(),
            Some(FormatError::Corrupt { offset: 0, .. })
        ));
    }

    #[test]
    fn test_nonzero_padding() {
        let mut data = vec![0x00];
        encode_vli(&mut data, 1).unwrap();
        encode_vli(&mut data, 200).unwrap();
        encode_vli(&mut data, 10).unwrap();
        // 5 bytes so far, three bytes of padding follow.
        data.extend_from_slice(&[0x00, 0x01, 0x00]);
        let crc = Crc32::compute(&data);
        data.extend_from_slice(&crc.to_le_bytes());

        let err = IndexDecoder::new(u64::MAX).decode(&data).unwrap_err();
        assert!(matches!(
            err.format_error(),
            Some(FormatError::Corrupt { offset: 6, .. })
        ));
    }

    #[test]
    fn test_unpadded_size_too_small() {
        let data = encode_index(&[(4, 10)]);
        let err = IndexDecoder::new(u64::MAX).decode(&data).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_memlimit() {
        let records: Vec<(u64, u64)> = (0..100).map(|_| (13, 10)).collect();
        let data = encode_index(&records);
        let err = IndexDecoder::new(Index::memusage(1, 10))
            .decode(&data)
            .unwrap_err();
        assert_eq!(err.codec_kind(), Some(CodecErrorKind::MemLimit));

        let mut decoder = IndexDecoder::new(Index::memusage(1, 100));
        assert_eq!(decoder.decode(&data).unwrap().1, DecompressStatus::Done);
    }
}
