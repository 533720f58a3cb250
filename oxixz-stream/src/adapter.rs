//! Byte-stream adapter over the XZ codec.
//!
//! [`XzStream`] wraps a source or sink and runs everything that passes
//! through it through an [`XzEncoder`] or [`XzDecoder`]. It is built for one
//! direction only: a compressing stream is written to, a decompressing
//! stream is read from, and the other half of the interface fails with
//! `UnsupportedOperation` without touching the wrapped stream.
//!
//! Compressed output is only complete after [`Write::flush`]: that is the
//! point where the encoder finishes the Stream (Index and Stream Footer).
//! Dropping a compressing stream without flushing releases the encoder and
//! leaves a truncated Stream behind.

use crate::codec::{XzDecoder, XzEncoder};
use crate::options::StreamOptions;
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use oxixz_core::traits::{CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Which way data flows through an [`XzStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Plain bytes written in, compressed bytes go to the sink.
    Compress,
    /// Compressed bytes read from the source, plain bytes come out.
    Decompress,
}

#[derive(Debug)]
enum Engine {
    Encoder(XzEncoder),
    Decoder(XzDecoder),
}

impl Engine {
    fn total_in(&self) -> u64 {
        match self {
            Engine::Encoder(e) => e.total_in(),
            Engine::Decoder(d) => d.total_in(),
        }
    }

    fn total_out(&self) -> u64 {
        match self {
            Engine::Encoder(e) => e.total_out(),
            Engine::Decoder(d) => d.total_out(),
        }
    }
}

/// Read/Write adapter that compresses into, or decompresses from, a wrapped stream.
///
/// # Example
///
/// ```rust
/// use oxixz_stream::{StreamOptions, XzStream};
/// use std::io::{Read, Write};
///
/// let mut writer = XzStream::compressor(Vec::new(), &StreamOptions::default())?;
/// writer.write_all(b"hello")?;
/// writer.flush()?;
/// let compressed = writer.into_inner().unwrap_or_default();
///
/// let mut reader = XzStream::decompressor(&compressed[..], &StreamOptions::default())?;
/// let mut text = String::new();
/// reader.read_to_string(&mut text)?;
/// assert_eq!(text, "hello");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct XzStream<S> {
    inner: Option<S>,
    engine: Option<Engine>,
    direction: Direction,
    /// Input buffer when decompressing, output buffer when compressing.
    buf: Vec<u8>,
    buf_pos: usize,
    buf_len: usize,
    eof: bool,
}

impl<W: Write> XzStream<W> {
    /// Compress everything written into `sink`.
    pub fn compressor(sink: W, options: &StreamOptions) -> Result<Self> {
        let encoder = XzEncoder::new(options)?;
        Ok(Self::with_engine(sink, Engine::Encoder(encoder), options))
    }
}

impl<R: Read> XzStream<R> {
    /// Decompress everything read from `source`.
    pub fn decompressor(source: R, options: &StreamOptions) -> Result<Self> {
        let decoder = XzDecoder::new(options)?;
        Ok(Self::with_engine(source, Engine::Decoder(decoder), options))
    }
}

#[allow(clippy::len_without_is_empty)]
impl<S> XzStream<S> {
    fn with_engine(inner: S, engine: Engine, options: &StreamOptions) -> Self {
        let direction = match engine {
            Engine::Encoder(_) => Direction::Compress,
            Engine::Decoder(_) => Direction::Decompress,
        };
        Self {
            inner: Some(inner),
            engine: Some(engine),
            direction,
            buf: vec![0u8; options.buffer_size()],
            buf_pos: 0,
            buf_len: 0,
            eof: false,
        }
    }

    /// Direction this stream was built for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether [`Read`] is supported.
    pub fn can_read(&self) -> bool {
        self.direction == Direction::Decompress && !self.is_closed()
    }

    /// Whether [`Write`] is supported.
    pub fn can_write(&self) -> bool {
        self.direction == Direction::Compress && !self.is_closed()
    }

    /// Always false: compressed streams are not seekable.
    pub fn can_seek(&self) -> bool {
        false
    }

    /// Always fails with `UnsupportedOperation`.
    pub fn len(&self) -> Result<u64> {
        Err(XzError::unsupported_operation("len"))
    }

    /// Always fails with `UnsupportedOperation`.
    pub fn position(&self) -> Result<u64> {
        Err(XzError::unsupported_operation("position"))
    }

    /// Whether the codec has reached the end of its stream.
    pub fn is_finished(&self) -> bool {
        match &self.engine {
            Some(Engine::Encoder(e)) => e.is_finished(),
            Some(Engine::Decoder(d)) => d.is_finished(),
            None => false,
        }
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Bytes fed into the codec so far.
    pub fn total_in(&self) -> u64 {
        self.engine.as_ref().map_or(0, Engine::total_in)
    }

    /// Bytes produced by the codec so far.
    pub fn total_out(&self) -> u64 {
        self.engine.as_ref().map_or(0, Engine::total_out)
    }

    /// The wrapped stream, unless closed.
    pub fn get_ref(&self) -> Option<&S> {
        self.inner.as_ref()
    }

    /// Release the codec state, then the wrapped stream.
    ///
    /// Calling it again does nothing. A compressing stream is not finished
    /// here; call [`Write::flush`] first.
    pub fn close(&mut self) {
        self.engine = None;
        self.inner = None;
    }

    /// Release the codec state and hand back the wrapped stream.
    ///
    /// Returns `None` if the stream was already closed.
    pub fn into_inner(mut self) -> Option<S> {
        self.engine = None;
        self.inner.take()
    }
}

impl<S> Drop for XzStream<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<R: Read> Read for XzStream<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.direction != Direction::Decompress {
            return Err(XzError::unsupported_operation("read").into());
        }
        let (Some(Engine::Decoder(decoder)), Some(source)) = (&mut self.engine, &mut self.inner)
        else {
            return Err(XzError::unsupported_operation("read after close").into());
        };
        if out.is_empty() || decoder.is_finished() {
            return Ok(0);
        }

        loop {
            if self.buf_pos == self.buf_len && !self.eof {
                let n = match source.read(&mut self.buf) {
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                self.buf_pos = 0;
                self.buf_len = n;
                self.eof = n == 0;
            }

            let flush = if self.eof {
                FlushMode::Finish
            } else {
                FlushMode::None
            };
            let (consumed, produced, status) =
                decoder.decompress(&self.buf[self.buf_pos..self.buf_len], out, flush)?;
            self.buf_pos += consumed;

            if produced > 0 || status == DecompressStatus::Done {
                return Ok(produced);
            }
            if self.eof && consumed == 0 {
                return Err(XzError::codec(CodecErrorKind::Buf).into());
            }
        }
    }
}

impl<W: Write> Write for XzStream<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.direction != Direction::Compress {
            return Err(XzError::unsupported_operation("write").into());
        }
        let (Some(Engine::Encoder(encoder)), Some(sink)) = (&mut self.engine, &mut self.inner)
        else {
            return Err(XzError::unsupported_operation("write after close").into());
        };
        if encoder.is_finished() {
            return Err(XzError::codec(CodecErrorKind::Program).into());
        }

        let mut pos = 0;
        while pos < data.len() {
            let (consumed, produced, _) =
                encoder.compress(&data[pos..], &mut self.buf, FlushMode::None)?;
            pos += consumed;
            if produced > 0 {
                sink.write_all(&self.buf[..produced])?;
            }
        }

        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let (Some(Engine::Encoder(encoder)), Some(sink)) = (&mut self.engine, &mut self.inner)
        else {
            return Ok(());
        };

        while !encoder.is_finished() {
            let (_, produced, status) = encoder.compress(&[], &mut self.buf, FlushMode::Finish)?;
            if produced > 0 {
                sink.write_all(&self.buf[..produced])?;
            }
            if status == CompressStatus::Done {
                break;
            }
        }

        sink.flush()
    }
}

impl<S> Seek for XzStream<S> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(XzError::unsupported_operation("seek").into())
    }
}
