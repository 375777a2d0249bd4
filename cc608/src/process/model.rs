//! Caption display model: two memory buffers and the mode state machine.
//!
//! The model owns a displayed and a non-displayed [`Memory`] buffer and
//! routes every mutation to the buffer the current mode writes to. Mode
//! transitions are driven exclusively by control codes arriving through
//! the byte decoder, never spontaneously.

use crate::structs::cell::CharColor;
use crate::structs::memory::{Memory, ROWS};
use crate::structs::pac::DecodedPac;

/// Captioning display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Roll-up captions with a window of 2, 3 or 4 rows.
    RollUp(u8),
    /// Pop-on: captions build in the non-displayed buffer and appear on
    /// EndOfCaption.
    PopOn,
    /// Paint-on: captions draw directly into the displayed buffer.
    PaintOn,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::RollUp(rows) => write!(f, "roll-up({rows})"),
            Mode::PopOn => write!(f, "pop-on"),
            Mode::PaintOn => write!(f, "paint-on"),
        }
    }
}

/// Which buffer mutations currently land in. An explicit enum rather than
/// a pointer into one of the buffers, so the active target is plain,
/// inspectable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteTarget {
    Displayed,
    NonDisplayed,
}

#[derive(Debug)]
pub struct Model {
    displayed: Memory,
    non_displayed: Memory,
    mode: Mode,
    target: WriteTarget,
    display_version: u32,
    pending_animation: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            displayed: Memory::default(),
            non_displayed: Memory::default(),
            mode: Mode::RollUp(3),
            target: WriteTarget::Displayed,
            display_version: 0,
            pending_animation: false,
        }
    }
}

impl Model {
    fn current(&mut self) -> &mut Memory {
        match self.target {
            WriteTarget::Displayed => &mut self.displayed,
            WriteTarget::NonDisplayed => &mut self.non_displayed,
        }
    }

    /// True when the current mode writes straight into the displayed
    /// buffer (roll-up and paint-on; pop-on builds off-screen).
    fn writing_to_displayed(&self) -> bool {
        matches!(self.mode, Mode::RollUp(_) | Mode::PaintOn)
    }

    fn displayed_memory_changed(&mut self) {
        self.display_version = self.display_version.wrapping_add(1);
    }

    pub fn character(&mut self, c: char) {
        self.current().write_char(c);

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn transparent_space(&mut self) {
        self.current().write_transparent_space();

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    /// Applies a PAC to the write target. In roll-up mode the PAC also
    /// re-anchors the roll-up window to the addressed row.
    pub fn pac(&mut self, pac: DecodedPac) {
        self.current().set_pac(pac);

        if matches!(self.mode, Mode::RollUp(_)) {
            self.current().set_roll_up_base_row(pac.row);
            self.displayed_memory_changed();
        }
    }

    pub fn mid_row_color(&mut self, color: CharColor, underline: bool) {
        self.current().mid_row_color(color, underline);

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn mid_row_style(&mut self, underline: bool, italics: bool) {
        self.current().mid_row_style(underline, italics);

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn flash_on(&mut self) {
        self.current().flash_on();

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn backspace(&mut self) {
        self.current().backspace();

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn delete_to_end_of_row(&mut self) {
        self.current().delete_to_end_of_row();

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    pub fn tab_offset(&mut self, columns: u8) {
        self.current().tab_offset(columns);

        if self.writing_to_displayed() {
            self.displayed_memory_changed();
        }
    }

    /// Switches to roll-up mode with a window of `rows` rows (RU2/RU3/RU4).
    /// Coming from pop-on or paint-on, both buffers are erased and the
    /// window re-anchors at the bottom of the screen.
    pub fn roll_up_captions(&mut self, rows: u8) {
        let from_static_mode = matches!(self.mode, Mode::PopOn | Mode::PaintOn);

        if from_static_mode {
            self.displayed.clear();
        }

        self.non_displayed.clear();
        self.target = WriteTarget::Displayed;
        self.pending_animation = false;

        if from_static_mode {
            self.displayed.set_roll_up_base_row(ROWS as u8);
            self.displayed.set_pac(DecodedPac {
                row: ROWS as u8,
                indent: 0,
                color: CharColor::White,
                underline: false,
                italics: false,
            });
        }

        // fall back to RU3 for a malformed row count
        let rows = if (2..=4).contains(&rows) { rows } else { 3 };
        self.mode = Mode::RollUp(rows);
        self.displayed.set_roll_up_row_count(rows);

        self.displayed_memory_changed();
    }

    /// RCL: switches to pop-on mode. Subsequent writes build in the
    /// non-displayed buffer; nothing is erased.
    pub fn resume_caption_loading(&mut self) {
        self.mode = Mode::PopOn;
        self.target = WriteTarget::NonDisplayed;
        self.pending_animation = false;
    }

    /// EOC: flips the buffers so the loaded caption appears, and keeps
    /// writing off-screen (into the buffer that was just displayed).
    pub fn end_of_caption(&mut self) {
        self.mode = Mode::PopOn;

        std::mem::swap(&mut self.displayed, &mut self.non_displayed);
        self.displayed_memory_changed();

        self.target = WriteTarget::NonDisplayed;
    }

    /// RDC: switches to paint-on mode, erasing the displayed buffer.
    pub fn resume_direct_captioning(&mut self) {
        self.displayed.clear();
        self.displayed_memory_changed();

        self.mode = Mode::PaintOn;
        self.target = WriteTarget::Displayed;
        self.pending_animation = false;
    }

    /// EDM: erases the displayed buffer in any mode.
    pub fn erase_displayed_memory(&mut self) {
        self.displayed.clear();
        self.displayed_memory_changed();
    }

    /// ENM: erases the non-displayed buffer; never visible on its own.
    pub fn erase_non_displayed_memory(&mut self) {
        self.non_displayed.clear();
    }

    /// CR: scrolls the roll-up window. A no-op outside roll-up mode.
    pub fn carriage_return(&mut self) {
        if matches!(self.mode, Mode::RollUp(_)) {
            self.current().carriage_return();
            self.pending_animation = true;
            self.displayed_memory_changed();
        }
    }

    /// Monotonically increasing counter bumped whenever the displayed
    /// buffer's visible content may have changed. Pollers re-render on a
    /// version change.
    pub fn display_version(&self) -> u32 {
        self.display_version
    }

    /// One-shot roll-up scroll signal for the renderer: true at most once
    /// after a carriage return in roll-up mode, then cleared. Reading it
    /// always consumes it.
    pub fn needs_animation(&mut self) -> bool {
        let needs = self.pending_animation && matches!(self.mode, Mode::RollUp(_));
        self.pending_animation = false;
        needs
    }

    pub fn displayed_memory(&self) -> &Memory {
        &self.displayed
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Clears both buffers and resets to the initial state (used for
    /// seek and track changes).
    pub fn clear(&mut self) {
        self.displayed.clear();
        self.non_displayed.clear();

        self.mode = Mode::RollUp(3);
        self.target = WriteTarget::Displayed;

        self.pending_animation = false;
        self.display_version = 0;

        self.displayed_memory_changed();
    }
}
