//! Byte-pair encoding helpers for tests: builds raw, parity-bearing pairs
//! the way a caption encoder would.

use crate::structs::cell::CharColor;

/// First PAC byte per 1-based row for channel 1; channel 2 adds 0x08.
const PAC_FIRST_BYTE: [u8; 15] = [
    0x11, 0x11, 0x12, 0x12, 0x15, 0x15, 0x16, 0x16, 0x17, 0x17, 0x10, 0x13, 0x13, 0x14, 0x14,
];

/// Rows addressed with the upper second-byte group (0x60..=0x7F).
const UPPER_GROUP_ROWS: [u8; 7] = [2, 4, 6, 8, 10, 13, 15];

/// Sets the odd-parity bit on a 7-bit value.
pub fn with_parity(b: u8) -> u8 {
    if b.count_ones() % 2 == 0 { b | 0x80 } else { b }
}

/// A raw byte pair with parity applied to both bytes.
pub fn pair(first: u8, second: u8) -> [u8; 2] {
    [with_parity(first), with_parity(second)]
}

/// A miscellaneous control code pair (RCL, RU2, CR, EOC, ...).
pub fn misc_pair(channel: u8, code: u8) -> [u8; 2] {
    let first = if channel == 1 { 0x14 } else { 0x1C };
    pair(first, code)
}

/// A Preamble Address Code pair. `row` is 1-based, `indent` a multiple
/// of 4; color, italics and indent are mutually exclusive on the wire,
/// as in real encoders.
pub fn pac_pair(
    row: u8,
    indent: u8,
    color: CharColor,
    underline: bool,
    italics: bool,
    channel: u8,
) -> [u8; 2] {
    let mut first = PAC_FIRST_BYTE[(row - 1) as usize];
    if channel == 2 {
        first |= 0x08;
    }

    let mut second = 0x40 + (color as u8) * 2 + underline as u8;
    if UPPER_GROUP_ROWS.contains(&row) {
        second += 0x20;
    }
    if italics {
        second += 0x0E;
    }
    if indent > 0 {
        second += 0x10 + indent / 2;
    }

    pair(first, second)
}

/// A color/underline mid-row code pair.
pub fn midrow_pair(color: CharColor, underline: bool, channel: u8) -> [u8; 2] {
    let first = if channel == 1 { 0x11 } else { 0x19 };
    pair(first, 0x20 + (color as u8) * 2 + underline as u8)
}

/// Encodes text as byte pairs, one character per pair padded with a null
/// second byte, the way single characters are commonly transmitted.
pub fn text_pairs(text: &str) -> Vec<u8> {
    text.bytes()
        .flat_map(|b| [with_parity(b), 0x80])
        .collect()
}
