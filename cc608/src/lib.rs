#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Decoder for CEA-608 (line 21) closed captions carried in ATSC A/53
//! user data.
//!
//! ### Data Organization
//!
//! **External Structure**: `GA94` user data envelopes carrying an array of
//! cc packets, each tagged with a field and a validity flag.
//! **Internal Structure**: two-byte caption pairs with odd parity; each
//! pair is a control code (PAC, mid-row, miscellaneous) or up to two
//! printable characters.
//!
//! ### Caption Modes
//!
//! - Pop-on: captions build off-screen and flip into view at once
//! - Roll-up: a 2-4 row window scrolls at the bottom of the screen
//! - Paint-on: characters appear directly as they arrive
//!
//! ## Quick Start
//!
//! Steps for processing caption streams:
//!
//! 1. Pull byte pairs out of user data payloads with
//!    [`process::extract::Extractor`]
//! 2. Feed the pairs to [`process::decode::ByteDecoder`]
//! 3. Render from the decoder's [`process::model::Model`] whenever its
//!    display version changes
//!
//! ```rust
//! use cc608::process::{decode::ByteDecoder, extract::Extractor, EXAMPLE_USER_DATA};
//!
//! let mut decoder = ByteDecoder::default();
//! decoder.set_caption_track(1)?;
//!
//! let extractor = Extractor::new(decoder.desired_field());
//! let pairs = extractor.extract(EXAMPLE_USER_DATA)?;
//! decoder.parse_bytes(&pairs);
//!
//! assert!(decoder.model().display_version() > 0);
//! println!("{}", decoder.model().displayed_memory().to_text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Caption processing pipeline.
///
/// 1. **Envelope Extraction** ([`process::extract`]): Locates `GA94` user
///    data and pulls out the byte pairs for one field.
///
/// 2. **Byte Decoding** ([`process::decode`]): Classifies and dispatches
///    byte pairs with parity, channel and repeat handling.
///
/// 3. **Display Model** ([`process::model`]): Dual-buffer caption memory
///    driven by the captioning mode state machine.
///
/// 4. **Staging** ([`process::queue`]): Timestamp-ordered queueing of
///    caption data between demux and render.
pub mod process;

/// Data structures representing caption memory and decoded codes.
///
/// - **Cells** ([`structs::cell`]): Characters with packed display attributes
/// - **Memory** ([`structs::memory`]): The 15x32 caption grid and cursor
/// - **PACs** ([`structs::pac`]): Preamble Address Code decoding and parity
/// - **Timestamps** ([`structs::timestamp`]): Presentation time keys
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): Bit-level envelope reads
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;

#[cfg(test)]
mod testsupport;
