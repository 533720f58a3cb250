//! # OxiXZ Core
//!
//! Core components shared by the OxiXZ crates.
//!
//! - [`error`]: The error taxonomy (I/O, container format, codec, unsupported operation)
//! - [`crc`]: CRC-32 as used by XZ Stream Header, Stream Footer and Index fields
//! - [`traits`]: Streaming compressor/decompressor traits the codec binding implements
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ oxixz-cli      info / compress / decompress / test      │
//! ├──────────────────────────────┬──────────────────────────┤
//! │ oxixz-index                  │ oxixz-stream             │
//! │   flags, vli, Index,         │   codec binding,         │
//! │   backward reconstruction    │   Read/Write adapter     │
//! ├──────────────────────────────┴──────────────────────────┤
//! │ oxixz-core (this crate)                                 │
//! │   XzError / FormatError, Crc32, Compressor/Decompressor │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxixz_core::crc::Crc32;
//! use oxixz_core::error::{FormatError, XzError};
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//!
//! let err = XzError::from(FormatError::TooSmall { size: 3 });
//! assert!(err.is_format());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use crc::Crc32;
pub use error::{CodecErrorKind, FormatError, Result, XzError};
pub use traits::{CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode, Preset};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::crc::Crc32;
    pub use crate::error::{CodecErrorKind, FormatError, Result, XzError};
    pub use crate::traits::{
        CompressStatus, Compressor, DecompressStatus, Decompressor, FlushMode, Preset,
    };
}
