//! Caption processing pipeline: envelope extraction, byte-pair decoding,
//! the display model, and timestamp-ordered staging.

/// Byte-pair classification and decoding.
pub mod decode;

/// ATSC `GA94` user data envelope extraction.
pub mod extract;

/// The dual-buffer caption display model.
pub mod model;

/// Timestamp-ordered caption data staging.
pub mod queue;

/// A small, well-formed user data payload: one envelope carrying a
/// ResumeDirectCaptioning control code followed by the characters "Hi" on
/// field 1, channel 1. Handy for demos and smoke tests.
pub const EXAMPLE_USER_DATA: &[u8] = &[
    0x47, 0x41, 0x39, 0x34, // GA94
    0x03, // user_data_type_code: cc_data
    0xC2, // process_cc_data_flag set, cc_count = 2
    0xFF, // em_data
    0xFC, 0x94, 0x29, // field 1: RDC
    0xFC, 0xC8, 0xE9, // field 1: "Hi"
    0xFF,
];
