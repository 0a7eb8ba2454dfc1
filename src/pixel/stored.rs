//! Stored-value helpers for raw DICOM sample words

/// Extract the `bits_stored` bits of interest whose top bit is `high_bit`
///
/// Returns 0 when `high_bit` lies below the stored range.
#[inline]
#[must_use]
pub fn stored_bits(value: u16, bits_stored: u16, high_bit: u16) -> u16 {
    if bits_stored == 0 || high_bit + 1 < bits_stored {
        return 0;
    }

    let shift = u32::from(high_bit + 1 - bits_stored);
    let mask = if bits_stored >= 16 {
        u32::from(u16::MAX)
    } else {
        (1u32 << bits_stored) - 1
    };

    u32::from(value)
        .checked_shr(shift)
        .map_or(0, |shifted| (shifted & mask) as u16)
}

/// 16-bit word starting at `index`, or `None` past the end of `bytes`
#[inline]
#[must_use]
pub fn endian_value(bytes: &[u8], index: usize, little_endian: bool) -> Option<u16> {
    let pair = [*bytes.get(index)?, *bytes.get(index + 1)?];
    Some(if little_endian {
        u16::from_le_bytes(pair)
    } else {
        u16::from_be_bytes(pair)
    })
}

/// Convert a stored value to output units
#[inline(always)]
#[must_use]
pub fn rescale(stored: f64, slope: f64, intercept: f64) -> f64 {
    stored.mul_add(slope, intercept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stored_bits_shifts() {
        assert_eq!(stored_bits(0x80, 8, 7), 128);
        assert_eq!(stored_bits(0x80, 8, 8), 64);
        assert_eq!(stored_bits(0x80, 8, 9), 32);
        assert_eq!(stored_bits(0x80, 8, 10), 16);
        assert_eq!(stored_bits(0x80, 8, 11), 8);

        assert_eq!(stored_bits(0x80, 12, 11), 128);
        assert_eq!(stored_bits(0x80, 12, 12), 64);
        assert_eq!(stored_bits(0x80, 12, 13), 32);
        assert_eq!(stored_bits(0x80, 12, 14), 16);
        assert_eq!(stored_bits(0x80, 12, 15), 8);
    }

    #[test]
    fn test_stored_bits_masks_outside_bits() {
        assert_eq!(stored_bits(0xFFFF, 8, 8), 255);
        assert_eq!(stored_bits(0xFE01, 8, 8), 0);
        assert_eq!(stored_bits(0xFFFF, 12, 12), 4095);
        assert_eq!(stored_bits(0xE001, 12, 12), 0);
        assert_eq!(stored_bits(0xBEEF, 16, 15), 0xBEEF);
    }

    #[test]
    fn test_stored_bits_high_bit_below_range() {
        for high_bit in 0..7 {
            assert_eq!(stored_bits(0xFFFF, 8, high_bit), 0);
        }
        for high_bit in 0..11 {
            assert_eq!(stored_bits(0xFFFF, 12, high_bit), 0);
        }
    }

    #[test]
    fn test_endian_value() {
        let bytes = [1u8, 2, 3, 4];
        assert_eq!(endian_value(&bytes, 0, true), Some(0x0201));
        assert_eq!(endian_value(&bytes, 1, true), Some(0x0302));
        assert_eq!(endian_value(&bytes, 2, true), Some(0x0403));
        assert_eq!(endian_value(&bytes, 0, false), Some(0x0102));
        assert_eq!(endian_value(&bytes, 2, false), Some(0x0304));
        assert_eq!(endian_value(&bytes, 3, true), None);
    }

    #[test]
    fn test_rescale() {
        assert_relative_eq!(rescale(1000.0, 1.0, -1024.0), -24.0);
        assert_relative_eq!(rescale(10.0, 2.5, 0.5), 25.5);
        // signed stored values
        assert_relative_eq!(rescale(-1.0, 1.0, -1024.0), -1025.0);
    }
}
