//! Built-in bitmap font
//!
//! A single 8×8 font covering the characters the rain animation uses:
//! digits, `A`, `E`, `P`, `S`, space, colon, period and hyphen.
//!
//! Each glyph is 8 rows of one byte, most significant bit = leftmost column.
//!
//! ```
//! use st7789_rain::font::{Font, FontSize, FONT_8X8};
//!
//! let font = Font::lookup(FontSize::new(8, 8));
//! assert!(font.is_some());
//! assert!(Font::lookup(FontSize::new(6, 10)).is_none());
//!
//! // Unsupported characters render as a blank cell
//! assert_eq!(FONT_8X8.glyph('z'), FONT_8X8.glyph(' '));
//! ```

/// One glyph: 8 rows, MSB is the leftmost pixel
pub type Glyph = [u8; 8];

/// Characters with a dedicated glyph, excluding space
pub const CHARSET: &[u8] = b"0123456789AEPS:.-";

/// Font cell size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSize {
    /// Cell width in pixels
    pub width: u8,
    /// Cell height in pixels
    pub height: u8,
}

impl FontSize {
    /// Create a font size
    pub const fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }
}

/// The 8×8 cell size
pub const SIZE_8X8: FontSize = FontSize::new(8, 8);

/// A fixed-size bitmap font
#[derive(Debug)]
pub struct Font {
    size: FontSize,
    glyph: fn(char) -> Option<&'static Glyph>,
}

/// The built-in 8×8 font
pub static FONT_8X8: Font = Font {
    size: SIZE_8X8,
    glyph: glyph_8x8,
};

const SPACE: Glyph = [0x00; 8];

impl Font {
    /// Find the built-in font for a cell size
    pub fn lookup(size: FontSize) -> Option<&'static Self> {
        if size == SIZE_8X8 {
            Some(&FONT_8X8)
        } else {
            None
        }
    }

    /// Cell size of this font
    pub fn size(&self) -> FontSize {
        self.size
    }

    /// Glyph for `ch`, falling back to the space glyph
    pub fn glyph(&self, ch: char) -> &'static Glyph {
        (self.glyph)(ch).unwrap_or(&SPACE)
    }

    /// Whether `ch` has its own glyph
    pub fn supports(&self, ch: char) -> bool {
        (self.glyph)(ch).is_some()
    }
}

fn glyph_8x8(ch: char) -> Option<&'static Glyph> {
    let glyph: &'static Glyph = match ch {
        '0' => &[0x3E, 0x7F, 0x71, 0x59, 0x4D, 0x7F, 0x3E, 0x00],
        '1' => &[0x40, 0x42, 0x7F, 0x7F, 0x40, 0x40, 0x00, 0x00],
        '2' => &[0x62, 0x73, 0x59, 0x49, 0x6F, 0x66, 0x00, 0x00],
        '3' => &[0x22, 0x63, 0x49, 0x49, 0x7F, 0x36, 0x00, 0x00],
        '4' => &[0x18, 0x1C, 0x16, 0x53, 0x7F, 0x7F, 0x50, 0x00],
        '5' => &[0x27, 0x67, 0x45, 0x45, 0x7D, 0x39, 0x00, 0x00],
        '6' => &[0x3C, 0x7E, 0x4B, 0x49, 0x79, 0x30, 0x00, 0x00],
        '7' => &[0x03, 0x03, 0x71, 0x79, 0x0F, 0x07, 0x00, 0x00],
        '8' => &[0x36, 0x7F, 0x49, 0x49, 0x7F, 0x36, 0x00, 0x00],
        '9' => &[0x06, 0x4F, 0x49, 0x69, 0x3F, 0x1E, 0x00, 0x00],
        'A' => &[0x7C, 0x7E, 0x13, 0x13, 0x7E, 0x7C, 0x00, 0x00],
        'E' => &[0x7F, 0x7F, 0x49, 0x49, 0x63, 0x63, 0x00, 0x00],
        'P' => &[0x7F, 0x7F, 0x09, 0x09, 0x0F, 0x06, 0x00, 0x00],
        'S' => &[0x66, 0x6F, 0x49, 0x49, 0x7B, 0x33, 0x00, 0x00],
        ' ' => &SPACE,
        ':' => &[0x00, 0x36, 0x36, 0x00, 0x00, 0x00, 0x00, 0x00],
        '.' => &[0x00, 0x60, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00],
        '-' => &[0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x00, 0x00],
        _ => return None,
    };
    Some(glyph)
}
