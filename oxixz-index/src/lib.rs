//! # OxiXZ Index
//!
//! Container metadata for .xz files: Stream Header/Footer flags, multibyte
//! integers, the Index field, and reconstruction of the combined Index of a
//! whole file without decompressing any Block.
//!
//! ## Features
//!
//! - **Backward scan** over any `Read + Seek` source
//! - **Concatenated Streams** and Stream Padding
//! - **Incremental Index decoding** over arbitrarily split input
//! - Per-Stream and per-Block listings with file offsets
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxixz_index::reconstruct;
//! use std::fs::File;
//!
//! let mut file = File::open("data.xz")?;
//! let info = reconstruct(&mut file)?;
//! println!(
//!     "{} streams, {} blocks, {} -> {} bytes",
//!     info.stream_count, info.block_count, info.file_size, info.uncompressed_size
//! );
//! # Ok::<(), oxixz_core::XzError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod flags;
pub mod index;
pub mod reconstruct;
pub mod vli;

// Re-exports
pub use decoder::IndexDecoder;
pub use flags::{CheckType, HEADER_SIZE, StreamFlags};
pub use index::{BlockInfo, BlockRecord, Index, StreamIndex, StreamInfo};
pub use reconstruct::{FileInfo, IO_BUFFER_SIZE, ScanOptions, reconstruct, reconstruct_with};
pub use vli::{VLI_MAX, decode_vli, encode_vli, vli_size};
