//! Variable-length integers ("multibyte integers" in the XZ format).
//!
//! Seven bits per byte, least significant group first, high bit set on every
//! byte except the last. At most nine bytes, so the largest value is 2^63 - 1.

use oxixz_core::error::{CodecErrorKind, Result, XzError};

/// Largest value a multibyte integer can hold.
pub const VLI_MAX: u64 = u64::MAX / 2;

/// Longest encoding in bytes.
pub const VLI_BYTES_MAX: usize = 9;

/// Decode a multibyte integer from the start of `data`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_vli(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;

    for (i, &byte) in data.iter().take(VLI_BYTES_MAX).enumerate() {
        value |= ((byte & 0x7F) as u64) << (i * 7);

        if byte & 0x80 == 0 {
            // A zero final byte after other bytes means a non-minimal encoding.
            if byte == 0x00 && i > 0 {
                return Err(XzError::corrupt(i as u64, "Non-minimal multibyte integer"));
            }
            return Ok((value, i + 1));
        }
    }

    if data.len() >= VLI_BYTES_MAX {
        Err(XzError::corrupt(0, "Multibyte integer too long"))
    } else {
        Err(XzError::codec(CodecErrorKind::Buf))
    }
}

/// Append the encoding of `value` to `output`.
pub fn encode_vli(output: &mut Vec<u8>, mut value: u64) -> Result<()> {
    if value > VLI_MAX {
        return Err(XzError::codec(CodecErrorKind::Program));
    }

    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            output.push(byte);
            break;
        }
        output.push(byte | 0x80);
    }

    Ok(())
}

/// Number of bytes [`encode_vli`] writes for `value`.
pub fn vli_size(value: u64) -> usize {
    let mut size = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        size += 1;
        rest >>= 7;
    }
    size
}

/// Incremental multibyte integer decoder for input that arrives in pieces.
#[derive(Debug, Clone, Default)]
pub(crate) struct VliReader {
    value: u64,
    pos: usize,
}

impl VliReader {
    /// Feed one byte. Returns the value once the final byte has been seen.
    pub(crate) fn push(&mut self, byte: u8) -> Result<Option<u64>> {
        if self.pos >= VLI_BYTES_MAX {
            return Err(XzError::corrupt(0, "Multibyte integer too long"));
        }

        self.value |= ((byte & 0x7F) as u64) << (self.pos * 7);
        self.pos += 1;

        if byte & 0x80 != 0 {
            if self.pos == VLI_BYTES_MAX {
                return Err(XzError::corrupt(0, "Multibyte integer too long"));
            }
            return Ok(None);
        }

        if byte == 0x00 && self.pos > 1 {
            return Err(XzError::corrupt(0, "Non-minimal multibyte integer"));
        }

        let value = self.value;
        *self = Self::default();
        Ok(Some(value))
    }
}
