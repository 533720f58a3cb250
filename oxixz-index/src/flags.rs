//! Stream Header / Stream Footer records.
//!
//! Both records are 12 bytes long and carry the same two-byte Stream Flags
//! field, which must match between the head and the tail of a Stream.
//!
//! ```text
//! Stream Header:  Magic (6) | Stream Flags (2) | CRC32 (4)
//! Stream Footer:  CRC32 (4) | Backward Size (4) | Stream Flags (2) | Magic (2)
//! ```
//!
//! Based on the XZ file format specification:
//! <https://tukaani.org/xz/xz-file-format.txt>

use oxixz_core::crc::Crc32;
use oxixz_core::error::{CodecErrorKind, Result, XzError};
use serde::Serialize;

/// Size of a Stream Header and of a Stream Footer in bytes.
pub const HEADER_SIZE: usize = 12;

/// [`HEADER_SIZE`] as a file offset quantity.
pub const HEADER_SIZE_U64: u64 = HEADER_SIZE as u64;

/// Stream Header magic bytes: 0xFD, '7', 'z', 'X', 'Z', 0x00
pub const HEADER_MAGIC: [u8; 6] = [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00];

/// Stream Footer magic bytes: 'Y', 'Z'
pub const FOOTER_MAGIC: [u8; 2] = [0x59, 0x5A];

/// Stream Padding and Backward Size granularity.
pub const PADDING_ALIGNMENT: u64 = 4;

/// Smallest Backward Size (an empty Index is 8 bytes, but the field can encode 4).
pub const BACKWARD_SIZE_MIN: u64 = 4;

/// Largest Backward Size the 32-bit field can encode.
pub const BACKWARD_SIZE_MAX: u64 = 1 << 34;

/// The only Stream Flags format version this crate understands.
pub const FORMAT_VERSION: u32 = 0;

/// Integrity check types.
///
/// The Stream Flags reserve four bits for the Check ID. Only four IDs are
/// assigned, but the size of every ID is fixed by the format, so unknown
/// checks can still be skipped over and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckType {
    /// No check.
    None,
    /// CRC-32.
    Crc32,
    /// CRC-64.
    Crc64,
    /// SHA-256.
    Sha256,
    /// An ID without an assigned algorithm (2-3, 5-9, 11-15).
    Reserved(u8),
}

impl CheckType {
    /// Largest valid Check ID.
    pub const ID_MAX: u8 = 0x0F;

    /// Create from check ID.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Crc32),
            0x04 => Some(Self::Crc64),
            0x0A => Some(Self::Sha256),
            id if id <= Self::ID_MAX => Some(Self::Reserved(id)),
            _ => None,
        }
    }

    /// The 4-bit Check ID.
    pub fn id(self) -> u8 {
        match self {
            CheckType::None => 0x00,
            CheckType::Crc32 => 0x01,
            CheckType::Crc64 => 0x04,
            CheckType::Sha256 => 0x0A,
            CheckType::Reserved(id) => id,
        }
    }

    /// Get the size of the check in bytes.
    pub fn size(self) -> usize {
        match self.id() {
            0 => 0,
            1..=3 => 4,
            4..=6 => 8,
            7..=9 => 16,
            10..=12 => 32,
            _ => 64,
        }
    }

    /// Display name, as `xz --list` prints it.
    pub fn name(self) -> String {
        match self {
            CheckType::None => "None".to_string(),
            CheckType::Crc32 => "CRC32".to_string(),
            CheckType::Crc64 => "CRC64".to_string(),
            CheckType::Sha256 => "SHA-256".to_string(),
            CheckType::Reserved(id) => format!("Unknown-{}", id),
        }
    }

    /// Whether an algorithm is assigned to this ID.
    pub fn is_known(self) -> bool {
        !matches!(self, CheckType::Reserved(_))
    }
}

/// Decoded Stream Flags plus the footer's Backward Size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFlags {
    /// Stream Flags format version. Always [`FORMAT_VERSION`] for decoded records.
    pub version: u32,
    /// Integrity check used by every Block of the Stream.
    pub check: CheckType,
    /// Size of the Index field in bytes. Only present for footers.
    pub backward_size: Option<u64>,
}

impl StreamFlags {
    /// Create new stream flags.
    pub fn new(check: CheckType) -> Self {
        Self {
            version: FORMAT_VERSION,
            check,
            backward_size: None,
        }
    }

    /// Set the Backward Size (needed to encode a footer).
    pub fn with_backward_size(mut self, backward_size: u64) -> Self {
        self.backward_size = Some(backward_size);
        self
    }

    /// Compare header and footer flags. Backward Size is not part of the comparison.
    pub fn flags_equal(&self, other: &StreamFlags) -> bool {
        self.version == other.version && self.check == other.check
    }

    /// Decode a Stream Header.
    pub fn decode_header(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        if buf[..6] != HEADER_MAGIC {
            return Err(XzError::corrupt(0, "Stream Header magic not found"));
        }

        let expected = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let computed = Crc32::compute(&buf[6..8]);
        if expected != computed {
            return Err(XzError::corrupt(
                6,
                format!(
                    "Stream Header CRC32 mismatch: expected {:#010x}, computed {:#010x}",
                    expected, computed
                ),
            ));
        }

        let check = Self::decode_flags([buf[6], buf[7]])?;
        Ok(Self::new(check))
    }

    /// Decode a Stream Footer.
    pub fn decode_footer(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        if buf[10..12] != FOOTER_MAGIC {
            return Err(XzError::corrupt(10, "Stream Footer magic not found"));
        }

        let expected = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let computed = Crc32::compute(&buf[4..10]);
        if expected != computed {
            return Err(XzError::corrupt(
                0,
                format!(
                    "Stream Footer CRC32 mismatch: expected {:#010x}, computed {:#010x}",
                    expected, computed
                ),
            ));
        }

        let check = Self::decode_flags([buf[8], buf[9]])?;
        let stored = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]) as u64;

        Ok(Self::new(check).with_backward_size((stored + 1) * 4))
    }

    /// Encode a Stream Header.
    pub fn encode_header(&self) -> Result<[u8; HEADER_SIZE]> {
        let flags = self.encode_flags()?;

        let mut buf = [0u8; HEADER_SIZE];
        buf[..6].copy_from_slice(&HEADER_MAGIC);
        buf[6..8].copy_from_slice(&flags);
        buf[8..12].copy_from_slice(&Crc32::compute(&flags).to_le_bytes());
        Ok(buf)
    }

    /// Encode a Stream Footer. Requires a valid Backward Size.
    pub fn encode_footer(&self) -> Result<[u8; HEADER_SIZE]> {
        let backward_size = match self.backward_size {
            Some(size)
                if (BACKWARD_SIZE_MIN..=BACKWARD_SIZE_MAX).contains(&size)
                    && size % PADDING_ALIGNMENT == 0 =>
            {
                size
            }
            _ => return Err(XzError::codec(CodecErrorKind::Program)),
        };
        let flags = self.encode_flags()?;

        let mut buf = [0u8; HEADER_SIZE];
        let stored = (backward_size / 4 - 1) as u32;
        buf[4..8].copy_from_slice(&stored.to_le_bytes());
        buf[8..10].copy_from_slice(&flags);
        let crc = Crc32::compute(&buf[4..10]);
        buf[..4].copy_from_slice(&crc.to_le_bytes());
        buf[10..12].copy_from_slice(&FOOTER_MAGIC);
        Ok(buf)
    }

    /// Decode the two Stream Flags bytes.
    fn decode_flags(bytes: [u8; 2]) -> Result<CheckType> {
        // First byte and the high nibble of the second are reserved for
        // future format versions.
        if bytes[0] != 0x00 || bytes[1] & 0xF0 != 0 {
            return Err(XzError::unsupported(format!(
                "Stream Flags use reserved bits: {:02x} {:02x}",
                bytes[0], bytes[1]
            )));
        }

        CheckType::from_id(bytes[1] & 0x0F)
            .ok_or_else(|| XzError::codec(CodecErrorKind::Program))
    }

    /// Encode the two Stream Flags bytes.
    fn encode_flags(&self) -> Result<[u8; 2]> {
        if self.version != FORMAT_VERSION {
            return Err(XzError::unsupported(format!(
                "Stream Flags version {} cannot be encoded",
                self.version
            )));
        }
        if self.check.id() > CheckType::ID_MAX {
            return Err(XzError::codec(CodecErrorKind::Program));
        }
        Ok([0x00, self.check.id()])
    }
}
