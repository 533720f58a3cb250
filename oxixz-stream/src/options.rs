//! Encoder/decoder configuration.

use oxixz_core::traits::Preset;
use oxixz_index::CheckType;

/// Default size of the adapter's internal buffer.
pub const STREAM_BUFFER_SIZE: usize = 8192;

/// Options for [`XzStream`](crate::XzStream) and the codec binding.
///
/// Compression uses `preset`, `extreme` and `check`; decompression uses
/// `memlimit` and `concatenated`. `buffer_size` applies to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    preset: Preset,
    extreme: bool,
    check: CheckType,
    memlimit: u64,
    concatenated: bool,
    buffer_size: usize,
}

impl StreamOptions {
    /// Preset 6, SHA-256 check, no memory limit, concatenated Streams accepted.
    pub fn new() -> Self {
        Self {
            preset: Preset::DEFAULT,
            extreme: false,
            check: CheckType::Sha256,
            memlimit: u64::MAX,
            concatenated: true,
            buffer_size: STREAM_BUFFER_SIZE,
        }
    }

    /// Set the compression preset (0-9).
    pub fn with_preset(mut self, preset: impl Into<Preset>) -> Self {
        self.preset = preset.into();
        self
    }

    /// Use the slower "extreme" variant of the preset.
    pub fn with_extreme(mut self, extreme: bool) -> Self {
        self.extreme = extreme;
        self
    }

    /// Set the integrity check written by the encoder.
    pub fn with_check(mut self, check: CheckType) -> Self {
        self.check = check;
        self
    }

    /// Limit decoder memory usage.
    pub fn with_memlimit(mut self, memlimit: u64) -> Self {
        self.memlimit = memlimit;
        self
    }

    /// Whether the decoder continues past the first Stream.
    pub fn with_concatenated(mut self, concatenated: bool) -> Self {
        self.concatenated = concatenated;
        self
    }

    /// Set the internal buffer size (at least one byte).
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Compression preset.
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Whether the extreme preset variant is used.
    pub fn extreme(&self) -> bool {
        self.extreme
    }

    /// Integrity check for new Streams.
    pub fn check(&self) -> CheckType {
        self.check
    }

    /// Decoder memory limit.
    pub fn memlimit(&self) -> u64 {
        self.memlimit
    }

    /// Whether concatenated Streams are decoded.
    pub fn concatenated(&self) -> bool {
        self.concatenated
    }

    /// Internal buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::new()
    }
}
