//! Caption memory: a fixed 15x32 grid of cells with a clamped cursor and
//! a roll-up window.
//!
//! Every operation clamps row and column indices into the grid instead of
//! panicking or wrapping. This decoder processes untrusted broadcast data;
//! malformed control-code sequences must degrade, never crash.

use crate::structs::cell::{CharColor, MemoryCell};
use crate::structs::pac::DecodedPac;

/// Caption rows per memory buffer.
pub const ROWS: usize = 15;

/// Cells per caption row.
pub const CELLS: usize = 32;

/// One row of caption memory. Rows are never resized, only cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    pub cells: [MemoryCell; CELLS],
}

impl Default for MemoryRow {
    fn default() -> Self {
        Self {
            cells: [MemoryCell::default(); CELLS],
        }
    }
}

impl MemoryRow {
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn contains_text(&self) -> bool {
        self.cells.iter().any(|cell| cell.character.is_some())
    }

    /// Plain-text rendering of the row; empty and transparent cells
    /// become spaces, trailing blanks are trimmed.
    pub fn text(&self) -> String {
        let mut s: String = self
            .cells
            .iter()
            .map(|cell| cell.character.unwrap_or(' '))
            .collect();
        s.truncate(s.trim_end().len());
        s
    }
}

/// One caption memory buffer: the cell grid plus cursor and roll-up
/// window state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    rows: [MemoryRow; ROWS],
    current_row: usize,
    current_cell: usize,
    /// 1-based bottom row of the roll-up window.
    roll_up_base_row: usize,
    /// Roll-up window height, 2..=4.
    roll_up_rows: usize,
}

impl Default for Memory {
    fn default() -> Self {
        let mut rows: [MemoryRow; ROWS] = std::array::from_fn(|_| MemoryRow::default());

        // each row starts with the default attribute of white
        for row in &mut rows {
            row.cells[0].attributes.set_color(CharColor::White);
        }

        Self {
            rows,
            current_row: 0,
            current_cell: 0,
            roll_up_base_row: ROWS,
            roll_up_rows: 3,
        }
    }
}

impl Memory {
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    pub fn rows(&self) -> &[MemoryRow; ROWS] {
        &self.rows
    }

    /// Cursor position as `(row, cell)`, both 0-based.
    pub fn cursor(&self) -> (usize, usize) {
        (self.current_row, self.current_cell)
    }

    pub fn roll_up_base_row(&self) -> usize {
        self.roll_up_base_row
    }

    pub fn roll_up_rows(&self) -> usize {
        self.roll_up_rows
    }

    /// Writes a character at the cursor and advances one cell, saturating
    /// at the last column (no wrap to the next row).
    pub fn write_char(&mut self, c: char) {
        self.rows[self.current_row].cells[self.current_cell].character = Some(c);
        self.current_cell = clamp_cell(self.current_cell + 1);
    }

    /// Marks the cursor cell as a transparent space and advances.
    pub fn write_transparent_space(&mut self) {
        self.rows[self.current_row].cells[self.current_cell].is_transparent_space = true;
        self.current_cell = clamp_cell(self.current_cell + 1);
    }

    /// Moves the cursor to the PAC's address and stamps the attributes on
    /// the cell there, so the next written character inherits them.
    pub fn set_pac(&mut self, pac: DecodedPac) {
        // row is 1-based on the wire, indent is 0-based
        self.current_row = clamp_row((pac.row as usize).saturating_sub(1));
        self.current_cell = clamp_cell(pac.indent as usize);

        let attrs = &mut self.rows[self.current_row].cells[self.current_cell].attributes;
        attrs.set_color(pac.color);
        attrs.set_underline(pac.underline);
        attrs.set_italics(pac.italics);
    }

    /// Color/underline mid-row code: stamps attributes, clears flash, and
    /// emits the space every mid-row code visually occupies.
    pub fn mid_row_color(&mut self, color: CharColor, underline: bool) {
        let attrs = &mut self.rows[self.current_row].cells[self.current_cell].attributes;
        attrs.set_color(color);
        attrs.set_underline(underline);
        attrs.set_flash(false);

        self.write_char(' ');
    }

    /// Italics mid-row code variant.
    pub fn mid_row_style(&mut self, underline: bool, italics: bool) {
        let attrs = &mut self.rows[self.current_row].cells[self.current_cell].attributes;
        attrs.set_underline(underline);
        attrs.set_italics(italics);
        attrs.set_flash(false);

        self.write_char(' ');
    }

    /// Flash-on: sets only the flash attribute, then emits a space.
    pub fn flash_on(&mut self) {
        self.rows[self.current_row].cells[self.current_cell]
            .attributes
            .set_flash(true);

        self.write_char(' ');
    }

    /// Moves the cursor back one cell (clamped at column 0) and clears the
    /// cell there. Column 0 always ends up as a clean white row start.
    pub fn backspace(&mut self) {
        self.current_cell = self.current_cell.saturating_sub(1);
        let cell = &mut self.rows[self.current_row].cells[self.current_cell];
        cell.clear();

        if self.current_cell == 0 {
            cell.attributes.set_color(CharColor::White);
        }
    }

    /// Clears all cells from the cursor to the end of the row.
    pub fn delete_to_end_of_row(&mut self) {
        for cell in &mut self.rows[self.current_row].cells[self.current_cell..] {
            cell.clear();
        }
    }

    /// Moves the roll-up window so its bottom row sits at `base_row`
    /// (1-based), carrying the visible rows along and clearing everything
    /// outside the new window. No-op if the base row is unchanged.
    pub fn set_roll_up_base_row(&mut self, base_row: u8) {
        let base = base_row as usize;

        if base == self.roll_up_base_row {
            return;
        }

        if !(1..=ROWS).contains(&base) {
            log::warn!("ignoring roll-up base row {base_row} outside 1..={ROWS}");
            return;
        }

        // lift the window rows out bottom-first, then place them at the
        // new base; taking first keeps overlapping moves correct
        let taken: Vec<Option<MemoryRow>> = (0..self.roll_up_rows)
            .map(|i| {
                self.roll_up_base_row
                    .checked_sub(i + 1)
                    .map(|src| std::mem::take(&mut self.rows[src]))
            })
            .collect();

        for (i, row) in taken.into_iter().enumerate() {
            if let (Some(row), Some(dst)) = (row, base.checked_sub(i + 1)) {
                self.rows[dst] = row;
            }
        }

        let window_top = base.saturating_sub(self.roll_up_rows);
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i < window_top || i >= base {
                row.clear();
            }
        }

        self.roll_up_base_row = base;
    }

    /// Sets the roll-up window height; values outside 2..=4 are ignored.
    pub fn set_roll_up_row_count(&mut self, count: u8) {
        if !(2..=4).contains(&count) {
            log::warn!("ignoring roll-up row count {count} outside 2..=4");
            return;
        }

        self.roll_up_rows = count as usize;
    }

    /// Scrolls the roll-up window up one row: the top window row drops
    /// off, the rest shift up, rows above the window are cleared, and the
    /// cursor returns to the start of the base row.
    pub fn carriage_return(&mut self) {
        let base = self.roll_up_base_row;
        let window_top = base.saturating_sub(self.roll_up_rows);

        for i in 0..base {
            if i >= window_top && i + 1 < base {
                self.rows[i] = std::mem::take(&mut self.rows[i + 1]);
            } else {
                self.rows[i].clear();
            }
        }

        self.current_row = clamp_row(base.saturating_sub(1));
        self.current_cell = 0;
    }

    /// Advances the cursor by `columns` cells, clamped to the row end.
    pub fn tab_offset(&mut self, columns: u8) {
        self.current_cell = clamp_cell(self.current_cell + columns as usize);
    }

    /// Plain-text rendering of the whole grid, one line per row.
    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(MemoryRow::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn clamp_row(position: usize) -> usize {
    position.min(ROWS - 1)
}

fn clamp_cell(position: usize) -> usize {
    position.min(CELLS - 1)
}
