//! CEA-608 byte-pair decoding.
//!
//! [`ByteDecoder`] consumes a flat stream of raw, parity-bearing byte
//! pairs, classifies each pair as a control code or character data,
//! filters by data channel, and drives the caption [`Model`]. Any input,
//! however malformed, leaves the decoder in a valid, continuable state.

use log::{debug, warn};

use crate::process::model::Model;
use crate::structs::cell::CharColor;
use crate::structs::pac::{decode_pac, parity_valid};
use crate::utils::errors::DecoderError;

/// Emitted in place of a character whose pair failed the parity check.
const SOLID_BLOCK: char = '\u{2588}';

/// Special character set (second byte 0x30..=0x3F). Index 9 (0x39) is the
/// transparent space and is handled before the table lookup.
const SPECIAL_CHARS: [char; 16] = [
    '®', '°', '½', '¿', '™', '¢', '£', '♪', 'à', ' ', 'è', 'â', 'ê', 'î', 'ô', 'û',
];

/// Extended Spanish, miscellaneous and French set (first byte 0x12/0x1A).
const EXTENDED_SPANISH_FRENCH: [char; 32] = [
    'Á', 'É', 'Ó', 'Ú', 'Ü', 'ü', '\u{2018}', '¡', // Spanish
    '*', '\'', '\u{2014}', '©', '\u{2120}', '\u{2022}', '\u{201C}', '\u{201D}', // misc
    'À', 'Â', 'Ç', 'È', 'Ê', 'Ë', 'ë', 'Î', 'Ï', 'ï', 'Ô', 'Ù', 'ù', 'Û', '«', '»', // French
];

/// Extended Portuguese, German and Danish set (first byte 0x13/0x1B).
const EXTENDED_PORTUGUESE_GERMAN_DANISH: [char; 32] = [
    'Ã', 'ã', 'Í', 'Ì', 'ì', 'Ò', 'ò', 'Õ', 'õ', '{', '}', '\\', '^', '_', '|', '~', // Portuguese
    'Ä', 'ä', 'Ö', 'ö', 'ß', '¥', '¤', '|', // German
    'Å', 'å', 'Ø', 'ø', '\u{231C}', '\u{231D}', '\u{231E}', '\u{231F}', // Danish
];

/// Control-code category for one classified byte pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlCode {
    Pac,
    MidRow,
    MiscControl,
    NotAControlCode,
}

/// Running counters over everything the decoder has consumed. Purely
/// observational; never feeds back into decoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecoderStats {
    pub pairs: u64,
    pub null_pairs: u64,
    pub parity_failures: u64,
    pub pac_codes: u64,
    pub mid_row_codes: u64,
    pub misc_codes: u64,
    pub repeats_suppressed: u64,
    pub channel_filtered: u64,
    pub characters: u64,
}

/// Stateful decoder for one caption-track session.
///
/// Construct once per track, select a caption track with
/// [`set_caption_track`](Self::set_caption_track), then feed even-length
/// byte-pair batches through [`parse_bytes`](Self::parse_bytes). All
/// effects are visible through [`model`](Self::model).
#[derive(Debug)]
pub struct ByteDecoder {
    model: Model,
    desired_field: u8,
    desired_channel: u8,
    /// Channel inferred from the most recent control code; printable
    /// characters inherit it.
    current_channel: u8,
    captions_active: bool,
    previous_first: u8,
    previous_second: u8,
    expect_repeat: bool,
    stats: DecoderStats,
}

impl Default for ByteDecoder {
    fn default() -> Self {
        Self {
            model: Model::default(),
            desired_field: 1,
            desired_channel: 1,
            current_channel: 1,
            captions_active: false,
            previous_first: 0x00,
            previous_second: 0x00,
            expect_repeat: false,
            stats: DecoderStats::default(),
        }
    }
}

impl ByteDecoder {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Field the decoder wants pairs for, 1 or 2. The envelope extractor
    /// is configured from this.
    pub fn desired_field(&self) -> u8 {
        self.desired_field
    }

    /// Selects the caption track: 0 disables captioning, 1..=4 map to
    /// (field 1, channel 1), (1, 2), (2, 1), (2, 2).
    pub fn set_caption_track(&mut self, track: u8) -> Result<(), DecoderError> {
        let old_field = self.desired_field;

        match track {
            0 => self.captions_active = false,
            1..=4 => {
                self.captions_active = true;
                self.desired_field = if track <= 2 { 1 } else { 2 };
                self.desired_channel = if track % 2 == 1 { 1 } else { 2 };
            }
            _ => return Err(DecoderError::InvalidCaptionTrack(track)),
        }

        if old_field != self.desired_field {
            // channel inference from the other field is meaningless
            self.current_channel = 1;
        }

        Ok(())
    }

    /// Clears decoder and model state without touching the track
    /// selection (seek / discontinuity handling).
    pub fn reset(&mut self) {
        self.previous_first = 0x00;
        self.previous_second = 0x00;
        self.expect_repeat = false;
        self.model.clear();
    }

    /// Consumes a flat, even-length buffer of raw byte pairs. A no-op
    /// while captioning is disabled. An odd trailing byte is dropped.
    pub fn parse_bytes(&mut self, data: &[u8]) {
        if !self.captions_active {
            return;
        }

        if data.len() % 2 != 0 {
            debug!("dropping odd trailing byte from {}-byte batch", data.len());
        }

        for pair in data.chunks_exact(2) {
            self.decode_byte_pair(pair[0], pair[1]);
        }
    }

    fn decode_byte_pair(&mut self, first: u8, second: u8) {
        self.stats.pairs += 1;

        if first == 0x80 && second == 0x80 {
            // null filler; keep the repeat expectation, since nulls may be
            // inserted between a control code and its repeat
            self.stats.null_pairs += 1;
            return;
        }

        if !parity_valid(first) || !parity_valid(second) {
            warn!("parity check failed on {first:#04X} {second:#04X}");
            self.stats.parity_failures += 1;
            // garbled characters render as a solid block
            self.model.character(SOLID_BLOCK);
            return;
        }

        let first = first & 0x7F;
        let second = second & 0x7F;

        let code = self.classify(first, second);
        if code != ControlCode::NotAControlCode {
            self.process_control_code(code, first, second);
            return;
        }

        // non-control data closes any pending repeat window
        self.expect_repeat = false;

        if self.is_special_char(first, second) {
            self.process_special_char(second);
            return;
        }

        if self.is_extended_char(first, second) {
            self.process_extended_char(first, second);
            return;
        }

        self.process_printable_pair(first, second);
    }

    fn classify(&mut self, first: u8, second: u8) -> ControlCode {
        if self.is_pac(first, second) {
            return ControlCode::Pac;
        }

        if self.is_mid_row_code(first, second) {
            return ControlCode::MidRow;
        }

        if self.is_misc_control_code(first, second) {
            return ControlCode::MiscControl;
        }

        ControlCode::NotAControlCode
    }

    // The is_* classifiers record the pair's data channel as a side
    // effect, before the channel filter runs. Channel tracking must
    // happen even for codes the filter then discards.

    fn is_pac(&mut self, first: u8, second: u8) -> bool {
        if !(0x40..=0x7F).contains(&second) {
            return false;
        }

        match first {
            0x10..=0x17 => {
                self.current_channel = 1;
                true
            }
            0x18..=0x1F => {
                self.current_channel = 2;
                true
            }
            _ => false,
        }
    }

    fn is_mid_row_code(&mut self, first: u8, second: u8) -> bool {
        if !(0x20..=0x2F).contains(&second) {
            return false;
        }

        match first {
            0x11 => {
                self.current_channel = 1;
                true
            }
            0x19 => {
                self.current_channel = 2;
                true
            }
            _ => false,
        }
    }

    fn is_misc_control_code(&mut self, first: u8, second: u8) -> bool {
        // tab offsets
        if (0x21..=0x23).contains(&second) && (first == 0x17 || first == 0x1F) {
            self.current_channel = if first == 0x17 { 1 } else { 2 };
            return true;
        }

        if (0x20..=0x2F).contains(&second) && (first == 0x14 || first == 0x1C) {
            self.current_channel = if first == 0x14 { 1 } else { 2 };
            return true;
        }

        false
    }

    fn process_control_code(&mut self, code: ControlCode, first: u8, second: u8) {
        if self.current_channel != self.desired_channel {
            self.stats.channel_filtered += 1;
            return;
        }

        // control codes are transmitted twice for redundancy; swallow
        // exactly one immediate repeat
        if self.expect_repeat && self.previous_first == first && self.previous_second == second {
            self.expect_repeat = false;
            self.stats.repeats_suppressed += 1;
            return;
        }

        self.expect_repeat = true;
        self.previous_first = first;
        self.previous_second = second;

        match code {
            ControlCode::Pac => {
                self.stats.pac_codes += 1;
                if let Some(pac) = decode_pac(first, second) {
                    self.model.pac(pac);
                }
            }
            ControlCode::MidRow => {
                self.stats.mid_row_codes += 1;
                self.dispatch_mid_row(second);
            }
            ControlCode::MiscControl => {
                self.stats.misc_codes += 1;
                self.dispatch_misc_control(first, second);
            }
            ControlCode::NotAControlCode => {}
        }
    }

    fn dispatch_mid_row(&mut self, second: u8) {
        match second {
            // italics variants carry no color
            0x2E => self.model.mid_row_style(false, true),
            0x2F => self.model.mid_row_style(true, true),
            0x20..=0x2D => {
                let color = CharColor::from_code((second - 0x20) >> 1);
                self.model.mid_row_color(color, second & 0x01 == 0x01);
            }
            _ => {}
        }
    }

    fn dispatch_misc_control(&mut self, first: u8, second: u8) {
        match first {
            0x14 | 0x1C => self.dispatch_misc_command(second),
            0x17 | 0x1F => match second {
                0x21 => self.model.tab_offset(1), // TO1
                0x22 => self.model.tab_offset(2), // TO2
                0x23 => self.model.tab_offset(3), // TO3
                _ => {}
            },
            _ => {}
        }
    }

    fn dispatch_misc_command(&mut self, second: u8) {
        match second {
            0x20 => self.model.resume_caption_loading(), // RCL
            0x21 => self.model.backspace(),              // BS
            0x22 | 0x23 => {}                            // AOF/AON, reserved
            0x24 => self.model.delete_to_end_of_row(),   // DER
            0x25 => self.model.roll_up_captions(2),      // RU2
            0x26 => self.model.roll_up_captions(3),      // RU3
            0x27 => self.model.roll_up_captions(4),      // RU4
            0x28 => self.model.flash_on(),               // FON
            0x29 => self.model.resume_direct_captioning(), // RDC
            0x2A | 0x2B => {}                            // TR/RTD, text mode
            0x2C => self.model.erase_displayed_memory(), // EDM
            0x2D => self.model.carriage_return(),        // CR
            0x2E => self.model.erase_non_displayed_memory(), // ENM
            0x2F => self.model.end_of_caption(),         // EOC
            _ => {}
        }
    }

    fn is_special_char(&mut self, first: u8, second: u8) -> bool {
        if !(0x30..=0x3F).contains(&second) {
            return false;
        }

        match first {
            0x11 => {
                self.current_channel = 1;
                true
            }
            0x19 => {
                self.current_channel = 2;
                true
            }
            _ => false,
        }
    }

    fn is_extended_char(&mut self, first: u8, second: u8) -> bool {
        if !(0x20..=0x3F).contains(&second) {
            return false;
        }

        match first {
            0x12 | 0x13 => {
                self.current_channel = 1;
                true
            }
            0x1A => {
                self.current_channel = 2;
                true
            }
            // 0x1B has always been tracked as channel 1 by deployed
            // decoders of this lineage; kept for compatibility
            0x1B => {
                self.current_channel = 1;
                true
            }
            _ => false,
        }
    }

    fn process_special_char(&mut self, second: u8) {
        if self.current_channel != self.desired_channel {
            return;
        }

        if second == 0x39 {
            self.model.transparent_space();
            self.stats.characters += 1;
            return;
        }

        self.emit(SPECIAL_CHARS[(second - 0x30) as usize]);
    }

    fn process_extended_char(&mut self, first: u8, second: u8) {
        if self.current_channel != self.desired_channel {
            return;
        }

        let table = match first {
            0x12 | 0x1A => &EXTENDED_SPANISH_FRENCH,
            0x13 | 0x1B => &EXTENDED_PORTUGUESE_GERMAN_DANISH,
            _ => return,
        };

        // encoders send a plain ASCII stand-in before the extended glyph;
        // erase it so only the real character remains
        self.model.backspace();
        self.emit(table[(second - 0x20) as usize]);
    }

    fn process_printable_pair(&mut self, first: u8, second: u8) {
        if self.current_channel != self.desired_channel {
            return;
        }

        // the first byte of a pair may be non-printing padding
        if !(0x00..=0x0F).contains(&first) {
            self.process_printable_char(first);
        }

        self.process_printable_char(second);
    }

    fn process_printable_char(&mut self, ch: u8) {
        if ch == 0x00 || !(0x20..=0x7F).contains(&ch) {
            return;
        }

        let c = match ch {
            0x27 => '\u{2019}', // curved apostrophe
            0x2A => 'á',
            0x5C => 'é',
            0x5E => 'í',
            0x5F => 'ó',
            0x60 => 'ú',
            0x7B => 'ç',
            0x7C => '÷',
            0x7D => 'Ñ',
            0x7E => 'ñ',
            0x7F => SOLID_BLOCK,
            _ => ch as char,
        };

        self.emit(c);
    }

    fn emit(&mut self, c: char) {
        self.model.character(c);
        self.stats.characters += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::memory::CELLS;
    use crate::testsupport::{midrow_pair, misc_pair, pac_pair, pair, text_pairs};

    fn decoder_on_track(track: u8) -> ByteDecoder {
        let mut decoder = ByteDecoder::default();
        decoder.set_caption_track(track).unwrap();
        decoder
    }

    fn displayed_row(decoder: &ByteDecoder, index: usize) -> String {
        decoder.model().displayed_memory().rows()[index].text()
    }

    #[test]
    fn track_mapping() {
        let mut decoder = ByteDecoder::default();

        decoder.set_caption_track(1).unwrap();
        assert_eq!(decoder.desired_field(), 1);
        decoder.set_caption_track(2).unwrap();
        assert_eq!(decoder.desired_field(), 1);
        decoder.set_caption_track(3).unwrap();
        assert_eq!(decoder.desired_field(), 2);
        decoder.set_caption_track(4).unwrap();
        assert_eq!(decoder.desired_field(), 2);

        assert!(decoder.set_caption_track(5).is_err());
    }

    #[test]
    fn inactive_track_ignores_everything() {
        let mut decoder = ByteDecoder::default();
        decoder.set_caption_track(0).unwrap();

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29));
        bytes.extend(text_pairs("Hi"));
        decoder.parse_bytes(&bytes);

        assert_eq!(decoder.model().display_version(), 0);
        assert_eq!(decoder.stats().pairs, 0);
    }

    #[test]
    fn paint_on_hello_end_to_end() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // RDC
        bytes.extend(pac_pair(1, 0, CharColor::White, false, false, 1));
        bytes.extend(text_pairs("Hi"));
        decoder.parse_bytes(&bytes);

        let memory = decoder.model().displayed_memory();
        assert_eq!(memory.rows()[0].cells[0].character, Some('H'));
        assert_eq!(memory.rows()[0].cells[1].character, Some('i'));
        assert!(decoder.model().display_version() > 0);
    }

    #[test]
    fn parity_failure_emits_solid_block() {
        let mut decoder = decoder_on_track(1);

        // 0x42 has two bits set; parity is even and therefore invalid
        decoder.parse_bytes(&[0x42, 0x42]);

        assert_eq!(decoder.stats().parity_failures, 1);
        assert_eq!(
            decoder.model().displayed_memory().rows()[0].cells[0].character,
            Some(SOLID_BLOCK)
        );
    }

    #[test]
    fn repeat_suppression_swallows_exactly_one_repeat() {
        let mut decoder = decoder_on_track(1);
        let ru2 = misc_pair(1, 0x25);

        decoder.parse_bytes(&ru2);
        let after_first = decoder.model().display_version();

        // the immediate repeat is redundancy, not a new command
        decoder.parse_bytes(&ru2);
        assert_eq!(decoder.model().display_version(), after_first);
        assert_eq!(decoder.stats().repeats_suppressed, 1);

        // a third transmission dispatches again
        decoder.parse_bytes(&ru2);
        assert_eq!(decoder.model().display_version(), after_first + 1);
    }

    #[test]
    fn null_pairs_preserve_repeat_expectation() {
        let mut decoder = decoder_on_track(1);
        let ru2 = misc_pair(1, 0x25);

        let mut bytes = Vec::new();
        bytes.extend(ru2);
        bytes.extend([0x80, 0x80]);
        bytes.extend(ru2);
        decoder.parse_bytes(&bytes);
        assert_eq!(decoder.stats().repeats_suppressed, 1);

        // printable data between the transmissions breaks the window
        let mut decoder = decoder_on_track(1);
        let mut bytes = Vec::new();
        bytes.extend(ru2);
        bytes.extend(text_pairs("a"));
        bytes.extend(ru2);
        decoder.parse_bytes(&bytes);
        assert_eq!(decoder.stats().repeats_suppressed, 0);
        assert_eq!(decoder.stats().misc_codes, 2);
    }

    #[test]
    fn channel_filter_follows_control_codes() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(2, 0x29)); // RDC on channel 2
        bytes.extend(text_pairs("no"));
        decoder.parse_bytes(&bytes);
        assert_eq!(decoder.stats().characters, 0);
        assert_eq!(decoder.stats().channel_filtered, 1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // back on channel 1
        bytes.extend(text_pairs("yes"));
        decoder.parse_bytes(&bytes);
        assert_eq!(decoder.stats().characters, 3);
    }

    #[test]
    fn special_characters_and_transparent_space() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // RDC
        bytes.extend(pair(0x11, 0x37)); // musical note
        bytes.extend(pair(0x11, 0x39)); // transparent space
        decoder.parse_bytes(&bytes);

        let row = &decoder.model().displayed_memory().rows()[0];
        assert_eq!(row.cells[0].character, Some('♪'));
        assert!(row.cells[1].is_transparent_space);
        assert_eq!(row.cells[1].character, None);
    }

    #[test]
    fn extended_character_replaces_ascii_stand_in() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // RDC
        bytes.extend(text_pairs("u"));
        bytes.extend(pair(0x12, 0x25)); // u with diaeresis
        decoder.parse_bytes(&bytes);

        let row = &decoder.model().displayed_memory().rows()[0];
        assert_eq!(row.cells[0].character, Some('ü'));
        assert_eq!(row.cells[1].character, None);
    }

    #[test]
    fn extended_0x1b_is_treated_as_channel_1() {
        // channel 2 never sees 0x1B extended characters
        let mut decoder = decoder_on_track(2);
        let mut bytes = Vec::new();
        bytes.extend(misc_pair(2, 0x29));
        bytes.extend(pair(0x1B, 0x20));
        decoder.parse_bytes(&bytes);
        assert_eq!(decoder.stats().characters, 0);

        // while channel 1 does
        let mut decoder = decoder_on_track(1);
        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29));
        bytes.extend(pair(0x1B, 0x20));
        decoder.parse_bytes(&bytes);
        assert_eq!(
            decoder.model().displayed_memory().rows()[0].cells[0].character,
            Some('Ã')
        );
    }

    #[test]
    fn printable_substitutions() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // RDC
        bytes.extend(pair(0x27, 0x7E)); // apostrophe + n-tilde
        decoder.parse_bytes(&bytes);

        let row = &decoder.model().displayed_memory().rows()[0];
        assert_eq!(row.cells[0].character, Some('\u{2019}'));
        assert_eq!(row.cells[1].character, Some('ñ'));
    }

    #[test]
    fn mid_row_code_changes_color_mid_line() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x29)); // RDC
        bytes.extend(pac_pair(15, 0, CharColor::White, false, false, 1));
        bytes.extend(text_pairs("ab"));
        bytes.extend(midrow_pair(CharColor::Yellow, false, 1));
        bytes.extend(text_pairs("cd"));
        decoder.parse_bytes(&bytes);

        let row = &decoder.model().displayed_memory().rows()[14];
        assert_eq!(row.text(), "ab cd");
        assert_eq!(row.cells[2].attributes.color(), CharColor::Yellow);
    }

    #[test]
    fn roll_up_scenario_via_byte_stream() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x25)); // RU2
        bytes.extend(pac_pair(15, 0, CharColor::White, false, false, 1));
        for line in ["first", "second", "third"] {
            bytes.extend(text_pairs(line));
            bytes.extend(misc_pair(1, 0x2D)); // CR
            bytes.extend([0x80, 0x80]); // null filler between lines
        }
        bytes.extend(text_pairs("fourth"));
        decoder.parse_bytes(&bytes);

        assert_eq!(displayed_row(&decoder, 13), "third");
        assert_eq!(displayed_row(&decoder, 14), "fourth");
        assert!(decoder.model_mut().needs_animation());
    }

    #[test]
    fn pop_on_flip_via_byte_stream() {
        let mut decoder = decoder_on_track(1);

        let mut bytes = Vec::new();
        bytes.extend(misc_pair(1, 0x20)); // RCL
        bytes.extend(pac_pair(12, 0, CharColor::White, false, false, 1));
        bytes.extend(text_pairs("hidden"));
        decoder.parse_bytes(&bytes);

        let version = decoder.model().display_version();
        assert!(!decoder.model().displayed_memory().rows()[11].contains_text());

        decoder.parse_bytes(&misc_pair(1, 0x2F)); // EOC
        assert_eq!(decoder.model().display_version(), version + 1);
        assert_eq!(displayed_row(&decoder, 11), "hidden");
    }

    #[test]
    fn arbitrary_bytes_never_panic() {
        // cheap xorshift; no external randomness needed
        let mut state = 0x2545F491_u32;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };

        for track in 1..=4 {
            let mut decoder = decoder_on_track(track);
            for _ in 0..2_000 {
                let batch: Vec<u8> = (0..64).map(|_| next()).collect();
                decoder.parse_bytes(&batch);
            }

            // decoder still functional afterwards
            decoder.reset();
            let (row, cell) = decoder.model().displayed_memory().cursor();
            assert!(row < 15 && cell < CELLS);
        }
    }
}
