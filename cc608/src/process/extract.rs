//! ATSC user data envelope extraction.
//!
//! Caption byte pairs arrive wrapped in an ATSC A/53 user data envelope
//! inside the video elementary stream. [`Extractor`] locates the `GA94`
//! registration marker, walks the bit-packed cc packet array, and returns
//! the raw byte pairs for one field, ready for
//! [`ByteDecoder::parse_bytes`](crate::process::decode::ByteDecoder::parse_bytes).

use anyhow::{Result, anyhow};
use log::Level;

use crate::log_or_err;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::EnvelopeError;

/// ATSC registration marker preceding the caption user data.
const GA94_MARKER: [u8; 4] = [0x47, 0x41, 0x39, 0x34];

/// User data type code for CEA-608/708 caption data.
const CC_DATA_TYPE_CODE: u8 = 0x03;

/// Pulls CEA-608 byte pairs for one field out of user data payloads.
///
/// Malformed envelopes are logged and yield an empty result by default;
/// raising the fail level turns them into hard errors for validation
/// workflows.
#[derive(Debug)]
pub struct Extractor {
    desired_field: u8,
    fail_level: Level,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            desired_field: 1,
            fail_level: Level::Error,
        }
    }
}

impl Extractor {
    /// Extractor for the given caption field (1 or 2).
    pub fn new(desired_field: u8) -> Self {
        Self {
            desired_field,
            ..Default::default()
        }
    }

    /// Log level at or above which envelope problems become errors
    /// instead of log lines.
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Extracts the byte pairs for the configured field from one user
    /// data payload. The marker may sit at any offset; everything before
    /// it is ignored. Returns an empty vector for payloads that carry no
    /// usable caption data.
    pub fn extract(&self, data: &[u8]) -> Result<Vec<u8>> {
        let Some(marker) = data.windows(4).position(|w| w == GA94_MARKER) else {
            log_or_err!(self, Level::Warn, anyhow!(EnvelopeError::MarkerNotFound));
            return Ok(Vec::new());
        };

        let payload = &data[marker + GA94_MARKER.len()..];

        // three header bytes plus at least one packet
        if payload.len() < 6 {
            log_or_err!(
                self,
                Level::Warn,
                anyhow!(EnvelopeError::InsufficientData(payload.len()))
            );
            return Ok(Vec::new());
        }

        let mut reader = BsIoSliceReader::from_slice(payload);

        let user_data_type_code: u8 = reader.get_n(8)?;
        if user_data_type_code != CC_DATA_TYPE_CODE {
            log_or_err!(
                self,
                Level::Warn,
                anyhow!(EnvelopeError::InvalidUserDataTypeCode(user_data_type_code))
            );
            return Ok(Vec::new());
        }

        reader.skip_n(1)?; // process_em_data_flag
        let process_cc_data_flag = reader.get()?;
        reader.skip_n(1)?; // additional_data_flag
        let cc_count: u8 = reader.get_n(5)?;
        reader.skip_n(8)?; // em_data

        if !process_cc_data_flag {
            log_or_err!(
                self,
                Level::Warn,
                anyhow!(EnvelopeError::ProcessCcDataFlagUnset)
            );
            return Ok(Vec::new());
        }

        // header bytes plus 3 bytes per packet; a trailing marker byte may
        // follow but is not required
        let needed = cc_count as usize * 3 + 3;
        if needed > payload.len() {
            log_or_err!(
                self,
                Level::Warn,
                anyhow!(EnvelopeError::TruncatedPacketArray {
                    needed,
                    available: payload.len(),
                })
            );
            return Ok(Vec::new());
        }

        let mut pairs = Vec::with_capacity(cc_count as usize * 2);

        for _ in 0..cc_count {
            reader.skip_n(5)?; // marker bits
            let cc_valid = reader.get()?;
            let cc_type: u8 = reader.get_n(2)?;
            let first: u8 = reader.get_n(8)?;
            let second: u8 = reader.get_n(8)?;

            // cc_type 0/1 are 608 field 1/2; 2/3 are DTVCC channel data
            if cc_valid && cc_type + 1 == self.desired_field {
                pairs.push(first);
                pairs.push(second);
            }
        }

        Ok(pairs)
    }
}
