//! RGB565 color type
//!
//! The ST7789 is driven in 16 bits-per-pixel mode. Each pixel is packed as
//! 5 bits red, 6 bits green and 5 bits blue and sent big-endian.
//!
//! | Bits    | 15..11 | 10..5 | 4..0 |
//! |---------|--------|-------|------|
//! | Channel | Red    | Green | Blue |
//!
//! ## Example
//!
//! ```
//! use st7789_rain::{color565, Color};
//!
//! assert_eq!(color565(255, 255, 255), 0xFFFF);
//! assert_eq!(Color::from_rgb(255, 0, 0), Color::RED);
//! assert_eq!(Color::from((0, 255, 0)).to_be_bytes(), [0x07, 0xE0]);
//! ```

/// Pack three 8-bit channels into a 16-bit RGB565 value
///
/// Low bits that do not fit the channel width are dropped.
pub const fn color565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// A 16-bit RGB565 pixel value
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Color(u16);

impl Color {
    /// Black (0x0000)
    pub const BLACK: Self = Self(0x0000);
    /// Blue (0x001F)
    pub const BLUE: Self = Self(0x001F);
    /// Red (0xF800)
    pub const RED: Self = Self(0xF800);
    /// Green (0x07E0)
    pub const GREEN: Self = Self(0x07E0);
    /// Cyan (0x07FF)
    pub const CYAN: Self = Self(0x07FF);
    /// Magenta (0xF81F)
    pub const MAGENTA: Self = Self(0xF81F);
    /// Yellow (0xFFE0)
    pub const YELLOW: Self = Self(0xFFE0);
    /// White (0xFFFF)
    pub const WHITE: Self = Self(0xFFFF);

    /// Wrap an already packed RGB565 value
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Build a color from 8-bit red, green and blue channels
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(color565(r, g, b))
    }

    /// The packed RGB565 value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Wire encoding of one pixel (big-endian)
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::from_rgb(r, g, b)
    }
}

impl From<u16> for Color {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Color> for u16 {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb565> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb565) -> Self {
        use embedded_graphics_core::pixelcolor::IntoStorage;
        Self(color.into_storage())
    }
}
