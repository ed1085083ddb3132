//! Byte and bit-level field extraction.
//!
//! Every header decoder in this crate reads its fields through these helpers,
//! so they are kept free of state and never allocate more than the value they
//! return.
use std::fmt::Write;

/// Number of bits in a byte.
pub const BYTE_BITS: u32 = 8;

/// How [`to_hex`] renders a byte span.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum HexStyle {
    /// Concatenated digits, e.g. `0a1b`.
    Bare,
    /// One byte per group, colon delimited, e.g. `0a:1b`.
    Colon,
    /// Concatenated digits with a `0x` prefix, e.g. `0x0a1b`.
    Prefixed,
}

/// Interpret up to 4 bytes as a big-endian unsigned integer.
///
/// An empty span is 0.
#[inline]
#[must_use]
pub fn to_unsigned(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4, "span wider than u32");
    bytes
        .iter()
        .fold(0, |acc, &byte| (acc << BYTE_BITS) | u32::from(byte))
}

/// Interpret up to 8 bytes as a big-endian unsigned integer.
///
/// Used where a 32-bit field must never be mistaken for a signed value.
#[inline]
#[must_use]
pub fn to_unsigned_wide(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8, "span wider than u64");
    bytes
        .iter()
        .fold(0, |acc, &byte| (acc << BYTE_BITS) | u64::from(byte))
}

/// Render a byte span as lower case hex.
///
/// Empty input renders as an empty string in every style, including
/// [`HexStyle::Prefixed`].
#[must_use]
pub fn to_hex(bytes: &[u8], style: HexStyle) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(bytes.len() * 3 + 2);
    if style == HexStyle::Prefixed {
        out.push_str("0x");
    }

    for (i, byte) in bytes.iter().enumerate() {
        if style == HexStyle::Colon && i > 0 {
            out.push(':');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Render a byte span as decimal octets joined by `.`, e.g. `192.168.1.1`.
#[must_use]
pub fn to_dotted_decimal(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a byte into its top `position` bits and its bottom `8 - position`
/// bits, both right-aligned.
///
/// Positions past 8 are treated as 8, so `split_bits(b, 0)` is `(0, b)` and
/// `split_bits(b, 8)` is `(b, 0)`.
#[inline]
#[must_use]
pub fn split_bits(byte: u8, position: u32) -> (u8, u8) {
    let position = position.min(BYTE_BITS);
    let high = byte.checked_shr(BYTE_BITS - position).unwrap_or(0);
    let low = byte & mask(BYTE_BITS - position);
    (high, low)
}

/// Split a byte into its high and low nibbles.
#[inline]
#[must_use]
pub fn split_nibbles(byte: u8) -> (u8, u8) {
    split_bits(byte, BYTE_BITS / 2)
}

/// Expand bytes into one 0/1 element per bit, most significant bit first.
#[must_use]
pub fn to_bit_array(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| {
            (0..BYTE_BITS as usize)
                .rev()
                .map(move |n| u8::from(crate::bitset(byte, n)))
        })
        .collect()
}

/// Concatenate byte spans in order.
#[must_use]
pub fn concat_bytes(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

// Mask with the lowest `bits` bits set.
#[inline]
fn mask(bits: u32) -> u8 {
    // bits is at most 8 here, so the shift never overflows a u16
    #[allow(clippy::cast_possible_truncation)]
    let mask = ((1u16 << bits) - 1) as u8;
    mask
}

#[cfg(test)]
mod tests {
    use super::{
        concat_bytes, split_bits, split_nibbles, to_bit_array, to_dotted_decimal, to_hex,
        to_unsigned, to_unsigned_wide, HexStyle,
    };

    #[test]
    fn to_unsigned_reads_big_endian() {
        assert_eq!(to_unsigned(&[0x01, 0x00]), 256);
        assert_eq!(to_unsigned(&[0xFF]), 255);
        assert_eq!(to_unsigned(&[0x00, 0x01, 0x02]), 0x0102);
        assert_eq!(to_unsigned(&[0xDE, 0xAD, 0xBE, 0xEF]), 0xDEAD_BEEF);
    }

    #[test]
    fn to_unsigned_matches_from_be_bytes() {
        for value in [0u32, 1, 0x7FFF_FFFF, 0x8000_0000, u32::MAX] {
            assert_eq!(to_unsigned(&value.to_be_bytes()), value);
        }
    }

    #[test]
    fn to_unsigned_is_zero_for_empty_span() {
        assert_eq!(to_unsigned(&[]), 0);
    }

    #[test]
    fn to_unsigned_wide_keeps_high_bit_unsigned() {
        assert_eq!(to_unsigned_wide(&[0xF6, 0x7A, 0x3C, 0xF9]), 4_135_206_137);
        assert_eq!(to_unsigned_wide(&[0xFF; 4]), u64::from(u32::MAX));
    }

    #[test]
    fn to_hex_renders_each_style() {
        let bytes = [0x0A, 0x1B, 0xFF];
        assert_eq!(to_hex(&bytes, HexStyle::Bare), "0a1bff");
        assert_eq!(to_hex(&bytes, HexStyle::Colon), "0a:1b:ff");
        assert_eq!(to_hex(&bytes, HexStyle::Prefixed), "0x0a1bff");
    }

    #[test]
    fn to_hex_is_empty_for_empty_span() {
        assert_eq!(to_hex(&[], HexStyle::Bare), "");
        assert_eq!(to_hex(&[], HexStyle::Colon), "");
        assert_eq!(to_hex(&[], HexStyle::Prefixed), "");
    }

    #[test]
    fn bare_hex_parses_back_into_same_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let hex = to_hex(&bytes, HexStyle::Bare);
        let parsed: Vec<u8> = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
            .collect();
        assert_eq!(parsed, bytes);
    }

    #[test]
    fn to_dotted_decimal_renders_address() {
        assert_eq!(to_dotted_decimal(&[192, 168, 1, 1]), "192.168.1.1");
        assert_eq!(to_dotted_decimal(&[]), "");
    }

    #[test]
    fn split_bits_recombines_to_original_byte() {
        for byte in 0..=u8::MAX {
            for position in 1..8 {
                let (high, low) = split_bits(byte, position);
                let low_bits = 8 - position;
                assert!(u32::from(high) < 1 << position);
                assert!(u32::from(low) < 1 << low_bits);
                assert_eq!((u32::from(high) << low_bits) | u32::from(low), u32::from(byte));
            }
        }
    }

    #[test]
    fn split_bits_returns_expected_groups() {
        assert_eq!(split_bits(0b1010_1101, 6), (0b10_1011, 0b01));
        assert_eq!(split_bits(0b0100_0000, 3), (0b010, 0));
        assert_eq!(split_nibbles(0x45), (4, 5));
    }

    #[test]
    fn split_bits_at_byte_edges_keeps_every_bit() {
        for byte in [0u8, 0x01, 0x80, 0xa5, 0xff] {
            assert_eq!(split_bits(byte, 0), (0, byte));
            assert_eq!(split_bits(byte, 8), (byte, 0));
            assert_eq!(split_bits(byte, 42), (byte, 0));
        }
    }

    #[test]
    fn to_bit_array_is_most_significant_first() {
        assert_eq!(to_bit_array(&[0x0A]), vec![0, 0, 0, 0, 1, 0, 1, 0]);
        assert_eq!(to_bit_array(&[0x80, 0x01]).len(), 16);
        assert_eq!(to_bit_array(&[0x80, 0x01])[0], 1);
        assert_eq!(to_bit_array(&[0x80, 0x01])[15], 1);
    }

    #[test]
    fn concat_bytes_preserves_order() {
        assert_eq!(concat_bytes(&[&[1], &[2, 3], &[]]), vec![1, 2, 3]);
    }
}
