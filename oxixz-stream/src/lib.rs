//! # OxiXZ Stream
//!
//! Streams bytes through an XZ encoder or decoder.
//!
//! - [`codec`]: [`XzEncoder`] / [`XzDecoder`], liblzma behind the
//!   `Compressor` / `Decompressor` traits of `oxixz-core`
//! - [`adapter`]: [`XzStream`], a `Read` (decompress) or `Write` (compress)
//!   wrapper around any source or sink
//! - [`options`]: [`StreamOptions`] shared by both
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxixz_stream::{StreamOptions, XzStream};
//! use std::fs::File;
//! use std::io::{self, Write};
//!
//! let input = File::open("data.bin")?;
//! let output = File::create("data.bin.xz")?;
//!
//! let mut writer = XzStream::compressor(output, &StreamOptions::default().with_preset(9))?;
//! io::copy(&mut io::BufReader::new(input), &mut writer)?;
//! writer.flush()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod codec;
pub mod options;

// Re-exports
pub use adapter::{Direction, XzStream};
pub use codec::{PRESET_EXTREME, XzDecoder, XzEncoder};
pub use options::{STREAM_BUFFER_SIZE, StreamOptions};
