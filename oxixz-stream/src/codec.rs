//! XZ encoder and decoder backed by liblzma.
//!
//! Both wrap a `liblzma::stream::Stream` and expose it through the
//! [`Compressor`] / [`Decompressor`] traits from `oxixz-core`, translating
//! flush modes, statuses and errors. liblzma frees its state when the
//! `Stream` is dropped.

use crate::options::StreamOptions;
use liblzma::stream::{Action, CONCATENATED, Check, Error as LzmaError, Status, Stream};
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use oxixz_core::traits::{CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode};
use oxixz_index::CheckType;

/// Flag OR-ed into the preset for the slower, stronger variant.
pub const PRESET_EXTREME: u32 = 1 << 31;

/// Translate a liblzma error into the codec error taxonomy.
pub(crate) fn codec_error(err: LzmaError) -> XzError {
    let kind = match err {
        LzmaError::Data => CodecErrorKind::Data,
        LzmaError::Options => CodecErrorKind::Options,
        LzmaError::Format => CodecErrorKind::Format,
        LzmaError::MemLimit => CodecErrorKind::MemLimit,
        LzmaError::Mem => CodecErrorKind::Mem,
        LzmaError::NoCheck => CodecErrorKind::NoCheck,
        LzmaError::UnsupportedCheck => CodecErrorKind::UnsupportedCheck,
        _ => CodecErrorKind::Program,
    };
    XzError::codec(kind)
}

fn lzma_check(check: CheckType) -> Result<Check> {
    match check {
        CheckType::None => Ok(Check::None),
        CheckType::Crc32 => Ok(Check::Crc32),
        CheckType::Crc64 => Ok(Check::Crc64),
        CheckType::Sha256 => Ok(Check::Sha256),
        CheckType::Reserved(_) => Err(XzError::codec(CodecErrorKind::UnsupportedCheck)),
    }
}

fn action(flush: FlushMode) -> Action {
    match flush {
        FlushMode::None => Action::Run,
        FlushMode::Sync => Action::SyncFlush,
        FlushMode::Full => Action::FullFlush,
        FlushMode::Finish => Action::Finish,
    }
}

/// Run one step and report (consumed, produced, status).
fn step(
    stream: &mut Stream,
    input: &[u8],
    output: &mut [u8],
    action: Action,
) -> Result<(usize, usize, Status)> {
    let before_in = stream.total_in();
    let before_out = stream.total_out();

    let status = stream.process(input, output, action).map_err(codec_error)?;

    let consumed = (stream.total_in() - before_in) as usize;
    let produced = (stream.total_out() - before_out) as usize;
    Ok((consumed, produced, status))
}

/// XZ encoder producing a single Stream.
pub struct XzEncoder {
    stream: Stream,
    finished: bool,
}

impl XzEncoder {
    /// Create an encoder from the preset, extreme flag and check in `options`.
    pub fn new(options: &StreamOptions) -> Result<Self> {
        let mut preset = options.preset().level() as u32;
        if options.extreme() {
            preset |= PRESET_EXTREME;
        }
        let check = lzma_check(options.check())?;
        let stream = Stream::new_easy_encoder(preset, check).map_err(codec_error)?;

        Ok(Self {
            stream,
            finished: false,
        })
    }

    /// Uncompressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Compressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }
}

impl Compressor for XzEncoder {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.finished {
            return Ok((0, 0, CompressStatus::Done));
        }

        let (consumed, produced, status) = step(&mut self.stream, input, output, action(flush))?;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                CompressStatus::Done
            }
            Status::MemNeeded => return Err(XzError::codec(CodecErrorKind::Buf)),
            _ if produced == output.len() => CompressStatus::NeedsOutput,
            _ => CompressStatus::NeedsInput,
        };

        Ok((consumed, produced, status))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

impl std::fmt::Debug for XzEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XzEncoder")
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .field("finished", &self.finished)
            .finish()
    }
}

/// XZ decoder, optionally across concatenated Streams.
pub struct XzDecoder {
    stream: Stream,
    finished: bool,
}

impl XzDecoder {
    /// Create a decoder honouring the memory limit and concatenation flag in `options`.
    pub fn new(options: &StreamOptions) -> Result<Self> {
        let flags = if options.concatenated() {
            CONCATENATED
        } else {
            0
        };
        let stream = Stream::new_stream_decoder(options.memlimit(), flags).map_err(codec_error)?;

        Ok(Self {
            stream,
            finished: false,
        })
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Uncompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }
}

impl Decompressor for XzDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.finished {
            return Ok((0, 0, DecompressStatus::Done));
        }

        // Only the end of input matters to the decoder.
        let action = match flush {
            FlushMode::Finish => Action::Finish,
            _ => Action::Run,
        };
        let (consumed, produced, status) = step(&mut self.stream, input, output, action)?;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                DecompressStatus::Done
            }
            Status::MemNeeded => return Err(XzError::codec(CodecErrorKind::Buf)),
            _ if produced == output.len() => DecompressStatus::NeedsOutput,
            _ => DecompressStatus::NeedsInput,
        };

        Ok((consumed, produced, status))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

impl std::fmt::Debug for XzDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XzDecoder")
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .field("finished", &self.finished)
            .finish()
    }
}
