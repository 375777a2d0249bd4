//! Caption cell storage: colors, packed display attributes, and cells.

/// CEA-608 character colors, in protocol numeric order.
///
/// The numeric values match the color codes carried by PACs and mid-row
/// codes (`code = color * 2 + underline`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CharColor {
    #[default]
    White = 0,
    Green = 1,
    Blue = 2,
    Cyan = 3,
    Red = 4,
    Yellow = 5,
    Magenta = 6,
}

impl CharColor {
    /// Maps a 3-bit protocol color code to a color. Out-of-range codes
    /// (7 is unused on the wire) fall back to white.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => CharColor::White,
            1 => CharColor::Green,
            2 => CharColor::Blue,
            3 => CharColor::Cyan,
            4 => CharColor::Red,
            5 => CharColor::Yellow,
            6 => CharColor::Magenta,
            _ => CharColor::White,
        }
    }
}

// Bitmasks used to store / retrieve data from the packed attribute byte.
const ATTRIBUTE_MASK: u8 = 0x01;
const UNDERLINE_MASK: u8 = 0x02;
const ITALICS_MASK: u8 = 0x04;
const FLASH_MASK: u8 = 0x08;
const COLOR_MASK: u8 = 0x70;

/// Display attributes for one cell, packed into a single byte.
///
/// Bit 0 records that any attribute has been explicitly set on the cell;
/// a following character inherits attributes from the cell a PAC or
/// mid-row code stamped them on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryAttributes {
    bits: u8,
}

impl MemoryAttributes {
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    pub fn contains_attributes(&self) -> bool {
        self.bits != 0
    }

    pub fn set_underline(&mut self, value: bool) {
        self.set_bit(ATTRIBUTE_MASK, true);
        self.set_bit(UNDERLINE_MASK, value);
    }

    pub fn is_underline(&self) -> bool {
        self.get_bit(UNDERLINE_MASK)
    }

    pub fn set_italics(&mut self, value: bool) {
        self.set_bit(ATTRIBUTE_MASK, true);
        self.set_bit(ITALICS_MASK, value);
    }

    pub fn is_italics(&self) -> bool {
        self.get_bit(ITALICS_MASK)
    }

    pub fn set_flash(&mut self, value: bool) {
        self.set_bit(ATTRIBUTE_MASK, true);
        self.set_bit(FLASH_MASK, value);
    }

    pub fn is_flash(&self) -> bool {
        self.get_bit(FLASH_MASK)
    }

    pub fn set_color(&mut self, value: CharColor) {
        self.set_bit(ATTRIBUTE_MASK, true);
        self.bits = (self.bits & !COLOR_MASK) | ((value as u8) << 4);
    }

    pub fn color(&self) -> CharColor {
        CharColor::from_code((self.bits & COLOR_MASK) >> 4)
    }

    fn set_bit(&mut self, mask: u8, value: bool) {
        if value {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    fn get_bit(&self, mask: u8) -> bool {
        self.bits & mask != 0
    }
}

/// One cell of caption memory.
///
/// A cell with no character that is not a transparent space renders as
/// blank background, not as a hole in the caption box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCell {
    pub character: Option<char>,
    pub attributes: MemoryAttributes,
    pub is_transparent_space: bool,
}

impl MemoryCell {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_transparent_space_or_empty(&self) -> bool {
        self.is_transparent_space || self.character.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_default_empty() {
        let attrs = MemoryAttributes::default();
        assert!(!attrs.contains_attributes());
        assert_eq!(attrs.color(), CharColor::White);
        assert!(!attrs.is_underline());
        assert!(!attrs.is_italics());
        assert!(!attrs.is_flash());
    }

    #[test]
    fn attributes_pack_and_unpack() {
        let mut attrs = MemoryAttributes::default();

        attrs.set_color(CharColor::Magenta);
        attrs.set_underline(true);
        attrs.set_flash(true);
        assert!(attrs.contains_attributes());
        assert_eq!(attrs.color(), CharColor::Magenta);
        assert!(attrs.is_underline());
        assert!(attrs.is_flash());
        assert!(!attrs.is_italics());

        attrs.set_color(CharColor::Blue);
        assert_eq!(attrs.color(), CharColor::Blue);
        assert!(attrs.is_underline());

        attrs.set_flash(false);
        assert!(!attrs.is_flash());
        // turning a bit off still leaves the cell marked as styled
        assert!(attrs.contains_attributes());

        attrs.clear();
        assert!(!attrs.contains_attributes());
    }

    #[test]
    fn cell_clear_resets_everything() {
        let mut cell = MemoryCell::default();
        cell.character = Some('A');
        cell.is_transparent_space = true;
        cell.attributes.set_italics(true);

        cell.clear();
        assert_eq!(cell.character, None);
        assert!(!cell.is_transparent_space);
        assert!(!cell.attributes.contains_attributes());
        assert!(cell.is_transparent_space_or_empty());
    }
}
