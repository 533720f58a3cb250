//! Streaming codec traits.
//!
//! The codec engine is driven through these push/pull interfaces: the caller
//! offers an input slice and an output slice, the codec reports how much of
//! each it used and where it stands. The Read/Write adapter in `oxixz-stream`
//! is written against these traits only.

use crate::error::{CodecErrorKind, Result, XzError};

/// Status of a streaming decompression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// Logical end of stream reached.
    Done,
}

/// Status of a streaming compression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// More input data can be accepted.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// The stream is complete.
    Done,
}

/// What the caller wants the codec to do with the input it has been given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Keep going; buffer as much as the codec likes.
    #[default]
    None,
    /// Emit all pending output without ending the stream.
    Sync,
    /// Emit pending output and reset encoder state at a block boundary.
    Full,
    /// No more input follows; complete the stream.
    Finish,
}

/// A streaming decompressor (decoder).
pub trait Decompressor {
    /// Decompress from `input` into `output`.
    ///
    /// `flush` is [`FlushMode::Finish`] once the caller knows no more input
    /// follows; any other mode means "more may come".
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Check if the decompressor has reached the end of the stream.
    fn is_finished(&self) -> bool;

    /// Decompress a complete buffer at once (convenience method).
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) =
                self.decompress(&input[input_pos..], &mut buffer, FlushMode::Finish)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == DecompressStatus::Done {
                break;
            }
            if consumed == 0 && produced == 0 && input_pos >= input.len() {
                return Err(XzError::codec(CodecErrorKind::Buf));
            }
        }

        Ok(output)
    }
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Compress from `input` into `output`.
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Check if the compressor has completed the stream.
    fn is_finished(&self) -> bool;

    /// Compress a complete buffer at once (convenience method).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) =
                self.compress(&input[input_pos..], &mut buffer, FlushMode::Finish)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(output)
    }
}

/// Compression preset (0-9), as understood by the codec engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset(u8);

impl Preset {
    /// Fastest compression.
    pub const FAST: Self = Self(0);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a preset (clamped to 0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the preset value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for Preset {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A codec that copies input to output and finishes when told to.
    struct Passthrough {
        finished: bool,
    }

    impl Compressor for Passthrough {
        fn compress(
            &mut self,
            input: &[u8],
            output: &mut [u8],
            flush: FlushMode,
        ) -> Result<(usize, usize, CompressStatus)> {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            if flush == FlushMode::Finish && n == input.len() {
                self.finished = true;
                return Ok((n, n, CompressStatus::Done));
            }
            Ok((n, n, CompressStatus::NeedsInput))
        }

        fn is_finished(&self) -> bool {
            self.finished
        }
    }

    #[test]
    fn test_preset() {
        assert_eq!(Preset::FAST.level(), 0);
        assert_eq!(Preset::DEFAULT.level(), 6);
        assert_eq!(Preset::BEST.level(), 9);
        assert_eq!(Preset::new(100).level(), 9);
        assert_eq!(Preset::from(3).level(), 3);
        assert_eq!(Preset::default(), Preset::DEFAULT);
    }

    #[test]
    fn test_flush_mode_default() {
        assert_eq!(FlushMode::default(), FlushMode::None);
    }

    #[test]
    fn test_compress_all_loops_until_done() {
        let data: Vec<u8> = (0..100_000u32).map(|i| i as u8).collect();
        let mut codec = Passthrough { finished: false };
        let out = codec.compress_all(&data).unwrap();
        assert_eq!(out, data);
        assert!(codec.is_finished());
    }
}
