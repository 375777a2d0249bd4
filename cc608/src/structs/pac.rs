//! Preamble Address Code decoding and odd-parity validation.
//!
//! A PAC is a two-byte control code that positions the cursor and sets
//! row, indent, color, underline and italics for the characters that
//! follow. Both decoders here expect bytes with the parity bit already
//! stripped (top bit masked to zero).

use crate::structs::cell::CharColor;

/// Base row for PAC first bytes `0x10..=0x17`, indexed by
/// `(first - 0x10) & 0xF7` (bit 3 is the channel bit and is masked off).
const PAC_BASE_ROW: [u8; 8] = [11, 1, 3, 12, 14, 5, 7, 9];

/// A decoded Preamble Address Code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPac {
    /// Caption row, 1-based (1..=15).
    pub row: u8,
    /// Indent in columns: 0, 4, 8, ... 28.
    pub indent: u8,
    pub color: CharColor,
    pub underline: bool,
    pub italics: bool,
}

/// Checks EIA-608 odd parity: the byte is valid if and only if it has an
/// odd number of set bits, counting the parity bit itself.
pub fn parity_valid(mut b: u8) -> bool {
    b ^= b >> 4;
    b ^= b >> 2;
    (b ^ (b >> 1)) & 0x01 != 0
}

/// Decodes a PAC byte pair, or returns `None` if either byte is outside
/// the PAC ranges. Malformed PACs are ignored by the caller, never fatal.
pub fn decode_pac(first: u8, second: u8) -> Option<DecodedPac> {
    // second byte group: 0x60..=0x7F addresses the row below 0x40..=0x5F
    let (group, diff) = match second {
        0x40..=0x5F => (0u8, second - 0x40),
        0x60..=0x7F => (1u8, second - 0x60),
        _ => return None,
    };

    if !(0x10..=0x1F).contains(&first) {
        return None;
    }

    let row = PAC_BASE_ROW[((first - 0x10) & 0xF7) as usize] + group;
    let underline = diff & 0x01 == 0x01;

    let mut color = CharColor::White;
    let mut italics = false;
    let mut indent = 0;

    if diff <= 0x0D {
        color = CharColor::from_code(diff >> 1);
    } else if diff <= 0x0F {
        italics = true;
    } else {
        // 0x10..=0x1F encodes the indent; the underline bit was already
        // consumed, so drop it before scaling to columns
        indent = ((diff - 0x10) & 0xFE) << 1;
    }

    Some(DecodedPac {
        row,
        indent,
        color,
        underline,
        italics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::pac_pair;

    #[test]
    fn parity_matches_popcount_for_all_bytes() {
        for b in 0..=u8::MAX {
            assert_eq!(parity_valid(b), b.count_ones() % 2 == 1, "byte {b:#04X}");
        }
    }

    fn encode_then_decode(
        row: u8,
        indent: u8,
        color: CharColor,
        underline: bool,
        italics: bool,
    ) -> DecodedPac {
        let [first, second] = pac_pair(row, indent, color, underline, italics, 1);
        decode_pac(first & 0x7F, second & 0x7F).expect("valid PAC")
    }

    #[test]
    fn round_trip_rows_and_indents() {
        for row in 1..=15 {
            for indent in (0..=28).step_by(4) {
                for underline in [false, true] {
                    let pac = encode_then_decode(row, indent, CharColor::White, underline, false);
                    assert_eq!(pac.row, row);
                    assert_eq!(pac.indent, indent);
                    assert_eq!(pac.color, CharColor::White);
                    assert_eq!(pac.underline, underline);
                    assert!(!pac.italics);
                }
            }
        }
    }

    #[test]
    fn round_trip_colors() {
        let colors = [
            CharColor::White,
            CharColor::Green,
            CharColor::Blue,
            CharColor::Cyan,
            CharColor::Red,
            CharColor::Yellow,
            CharColor::Magenta,
        ];

        for color in colors {
            for underline in [false, true] {
                let pac = encode_then_decode(5, 0, color, underline, false);
                assert_eq!(pac.color, color);
                assert_eq!(pac.underline, underline);
                assert_eq!(pac.indent, 0);
            }
        }
    }

    #[test]
    fn round_trip_italics() {
        for underline in [false, true] {
            let pac = encode_then_decode(12, 0, CharColor::White, underline, true);
            assert!(pac.italics);
            assert_eq!(pac.color, CharColor::White);
            assert_eq!(pac.underline, underline);
        }
    }

    #[test]
    fn channel_bit_is_ignored_for_row() {
        // channel 2 PACs (first byte + 0x08) address the same rows
        let [first, second] = pac_pair(9, 8, CharColor::White, false, false, 2);
        let pac = decode_pac(first & 0x7F, second & 0x7F).unwrap();
        assert_eq!(pac.row, 9);
        assert_eq!(pac.indent, 8);
    }

    #[test]
    fn rejects_out_of_range_bytes() {
        assert_eq!(decode_pac(0x0F, 0x40), None);
        assert_eq!(decode_pac(0x20, 0x40), None);
        assert_eq!(decode_pac(0x10, 0x3F), None);
        assert_eq!(decode_pac(0x10, 0x00), None);
    }
}
