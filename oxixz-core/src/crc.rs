//! CRC-32 (ISO 3309) as used by the XZ container.
//!
//! XZ protects the Stream Header flags, the Stream Footer (Backward Size and
//! flags) and every Index field with CRC-32. Those records are small, so the
//! bulk path only matters for large Index fields; it uses slicing-by-8 over
//! `chunks_exact` and falls back to the single table for the tail.

/// CRC-32 lookup tables (polynomial 0xEDB88320, reflected).
///
/// Table 0 is the classic byte-at-a-time table; tables 1-7 extend it for
/// slicing-by-8.
const CRC32_TABLES: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];

    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        tables[0][i] = crc;
        i += 1;
    }

    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }

    tables
};

/// Incremental CRC-32 calculator.
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
///
/// # Example
///
/// ```
/// use oxixz_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"1234");
/// crc.update(b"56789");
/// assert_eq!(crc.finalize(), 0xCBF43926);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFFFFFF }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0xFFFFFFFF;
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        let mut c = self.crc;
        let mut chunks = data.chunks_exact(8);

        for chunk in &mut chunks {
            let x = c ^ u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            c = CRC32_TABLES[7][(x & 0xFF) as usize]
                ^ CRC32_TABLES[6][((x >> 8) & 0xFF) as usize]
                ^ CRC32_TABLES[5][((x >> 16) & 0xFF) as usize]
                ^ CRC32_TABLES[4][(x >> 24) as usize]
                ^ CRC32_TABLES[3][chunk[4] as usize]
                ^ CRC32_TABLES[2][chunk[5] as usize]
                ^ CRC32_TABLES[1][chunk[6] as usize]
                ^ CRC32_TABLES[0][chunk[7] as usize];
        }

        for &byte in chunks.remainder() {
            c = CRC32_TABLES[0][((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
        }

        self.crc = c;
    }

    /// Get the current CRC value (without finalizing).
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytewise(data: &[u8]) -> u32 {
        let mut c = 0xFFFFFFFFu32;
        for &b in data {
            c = CRC32_TABLES[0][((c ^ b as u32) & 0xFF) as usize] ^ (c >> 8);
        }
        c ^ 0xFFFFFFFF
    }

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(&[]), 0);
    }

    #[test]
    fn test_crc32_check() {
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_stream_flags() {
        // Stream Flags for CRC64 check, as they appear in every xz file made by xz-utils.
        assert_eq!(Crc32::compute(&[0x00, 0x04]), 0x46B4D6E6);
    }

    #[test]
    fn test_crc32_incremental() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 251) as u8).collect();
        let mut crc = Crc32::new();
        for piece in data.chunks(7) {
            crc.update(piece);
        }
        assert_eq!(crc.value(), Crc32::compute(&data));
    }

    #[test]
    fn test_crc32_slicing_matches_bytewise() {
        for len in [0usize, 1, 7, 8, 9, 15, 16, 17, 63, 64, 65, 1023] {
            let data: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(17)).collect();
            assert_eq!(Crc32::compute(&data), bytewise(&data), "len {}", len);
        }
    }

    #[test]
    fn test_crc32_reset() {
        let mut crc = Crc32::new();
        crc.update(b"garbage");
        crc.reset();
        crc.update(b"123456789");
        assert_eq!(crc.finalize(), 0xCBF43926);
    }
}
