//! Error types for OxiXZ operations.
//!
//! Errors fall into four families:
//!
//! - [`XzError::Io`]: the byte source failed to seek, read or write.
//! - [`XzError::Format`]: the container metadata is structurally invalid
//!   (see [`FormatError`]). Never retryable.
//! - [`XzError::Codec`]: the codec engine reported a non-success status
//!   (see [`CodecErrorKind`]).
//! - [`XzError::UnsupportedOperation`]: a programming error such as reading
//!   from a compressing stream.

use std::fmt;
use std::io;
use thiserror::Error;

/// Structural validation failures in XZ container metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input is shorter than a Stream Header plus a Stream Footer.
    #[error("File is too small to be a .xz file: {size} bytes")]
    TooSmall {
        /// Total size of the input in bytes.
        size: u64,
    },

    /// Truncated, garbled or out-of-range metadata.
    #[error("Compressed data is corrupt at offset {offset}: {message}")]
    Corrupt {
        /// Absolute file offset the problem was detected at.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Two metadata records that must agree do not.
    #[error("Inconsistent metadata at offset {offset}: {message}")]
    Inconsistent {
        /// Absolute file offset the problem was detected at.
        offset: u64,
        /// Description of the mismatch.
        message: String,
    },

    /// The metadata uses a format version or reserved feature this crate does not know.
    #[error("Unsupported options: {message}")]
    Unsupported {
        /// Description of the unsupported feature.
        message: String,
    },
}

/// Status families the codec engine can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecErrorKind {
    /// Cannot allocate memory.
    Mem,
    /// Memory usage limit was reached.
    MemLimit,
    /// Input is not in a recognized format.
    Format,
    /// Invalid or unsupported options.
    Options,
    /// Compressed data is corrupt.
    Data,
    /// No progress is possible (input ended too early).
    Buf,
    /// The codec was driven incorrectly.
    Program,
    /// The stream has no integrity check.
    NoCheck,
    /// The integrity check type is not supported by the codec.
    UnsupportedCheck,
}

impl CodecErrorKind {
    /// Human-readable message for this status.
    pub fn message(self) -> &'static str {
        match self {
            CodecErrorKind::Mem => "Memory error",
            CodecErrorKind::MemLimit => "Memory usage limit reached",
            CodecErrorKind::Format => "File format not recognized",
            CodecErrorKind::Options => "Unsupported options",
            CodecErrorKind::Data => "Compressed data is corrupt",
            CodecErrorKind::Buf => "Unexpected end of input",
            CodecErrorKind::Program => "Internal error (bug)",
            CodecErrorKind::NoCheck => "No integrity check; not verifying file integrity",
            CodecErrorKind::UnsupportedCheck => {
                "Unsupported type of integrity check; not verifying file integrity"
            }
        }
    }
}

impl fmt::Display for CodecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The main error type for OxiXZ operations.
#[derive(Debug, Error)]
pub enum XzError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid container metadata.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Non-success status from the codec engine.
    #[error("Codec error: {kind}")]
    Codec {
        /// The status family.
        kind: CodecErrorKind,
    },

    /// The operation is not available on this object.
    #[error("Operation not supported: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

/// Result type alias for OxiXZ operations.
pub type Result<T> = std::result::Result<T, XzError>;

impl XzError {
    /// Create a too-small error.
    pub fn too_small(size: u64) -> Self {
        Self::Format(FormatError::TooSmall { size })
    }

    /// Create a corrupt-data error.
    pub fn corrupt(offset: u64, message: impl Into<String>) -> Self {
        Self::Format(FormatError::Corrupt {
            offset,
            message: message.into(),
        })
    }

    /// Create an inconsistent-metadata error.
    pub fn inconsistent(offset: u64, message: impl Into<String>) -> Self {
        Self::Format(FormatError::Inconsistent {
            offset,
            message: message.into(),
        })
    }

    /// Create an unsupported-format error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Format(FormatError::Unsupported {
            message: message.into(),
        })
    }

    /// Create a codec error.
    pub fn codec(kind: CodecErrorKind) -> Self {
        Self::Codec { kind }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported_operation(operation: &'static str) -> Self {
        Self::UnsupportedOperation { operation }
    }

    /// Whether this is a container format error.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// The format error, if this is one.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }

    /// The codec status, if this is a codec error.
    pub fn codec_kind(&self) -> Option<CodecErrorKind> {
        match self {
            Self::Codec { kind } => Some(*kind),
            _ => None,
        }
    }

    /// Attach an absolute offset to a format error produced without one.
    ///
    /// Record decoders work on fixed-size buffers and report offset 0; the
    /// caller knows where the buffer came from.
    pub fn at_offset(self, base: u64) -> Self {
        match self {
            Self::Format(FormatError::Corrupt { offset, message }) => {
                Self::Format(FormatError::Corrupt {
                    offset: base.saturating_add(offset),
                    message,
                })
            }
            Self::Format(FormatError::Inconsistent { offset, message }) => {
                Self::Format(FormatError::Inconsistent {
                    offset: base.saturating_add(offset),
                    message,
                })
            }
            other => other,
        }
    }
}

impl From<XzError> for io::Error {
    fn from(err: XzError) -> Self {
        let kind = match err {
            XzError::Io(inner) => return inner,
            XzError::Format(_) => io::ErrorKind::InvalidData,
            XzError::Codec { kind } => match kind {
                CodecErrorKind::Data
                | CodecErrorKind::Format
                | CodecErrorKind::Options
                | CodecErrorKind::UnsupportedCheck
                | CodecErrorKind::NoCheck => io::ErrorKind::InvalidData,
                CodecErrorKind::Buf => io::ErrorKind::UnexpectedEof,
                CodecErrorKind::Mem | CodecErrorKind::MemLimit | CodecErrorKind::Program => {
                    io::ErrorKind::Other
                }
            },
            XzError::UnsupportedOperation { .. } => io::ErrorKind::Unsupported,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = XzError::too_small(10);
        assert!(err.to_string().contains("too small"));

        let err = XzError::corrupt(128, "Index CRC32 mismatch");
        assert!(err.to_string().contains("128"));
        assert!(err.to_string().contains("Index CRC32 mismatch"));

        let err = XzError::codec(CodecErrorKind::MemLimit);
        assert!(err.to_string().contains("Memory usage limit reached"));

        let err = XzError::unsupported_operation("seek");
        assert!(err.to_string().contains("seek"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: XzError = io_err.into();
        assert!(matches!(err, XzError::Io(_)));

        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_into_io_error_kinds() {
        let err: io::Error = XzError::unsupported_operation("read").into();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        let inner = err.into_inner().unwrap();
        let inner = inner.downcast::<XzError>().unwrap();
        assert!(matches!(*inner, XzError::UnsupportedOperation { operation: "read" }));

        let err: io::Error = XzError::corrupt(0, "bad").into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = XzError::codec(CodecErrorKind::Buf).into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_at_offset() {
        let err = XzError::corrupt(4, "bad").at_offset(100);
        assert_eq!(
            err.format_error(),
            Some(&FormatError::Corrupt {
                offset: 104,
                message: "bad".into()
            })
        );

        let err = XzError::too_small(3).at_offset(100);
        assert_eq!(err.format_error(), Some(&FormatError::TooSmall { size: 3 }));
    }
}
