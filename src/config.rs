//! Display configuration types and builder

use crate::color::Color;
use crate::command::{
    COLOR_MODE_16BIT, COLOR_MODE_65K, MADCTL_BGR, MADCTL_MH, MADCTL_ML, MADCTL_MV, MADCTL_MX,
    MADCTL_MY, MADCTL_RGB,
};
pub use crate::error::{BuilderError, MAX_BUFFER_PIXELS, MAX_DIMENSION};

/// Default transfer buffer size in pixels
pub const DEFAULT_BUFFER_PIXELS: usize = 256;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Width in pixels (columns)
    pub width: u16,
    /// Height in pixels (rows)
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or
    /// larger than [`MAX_DIMENSION`].
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_DIMENSION || height == 0 || height > MAX_DIMENSION {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels on the panel
    pub fn area(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }
}

/// Scan orientation written to MADCTL (MV/MX/MY combinations)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Orientation {
    /// Native scan order
    #[default]
    Normal,
    /// Columns mirrored (MX)
    MirrorX,
    /// Rows mirrored (MY)
    MirrorY,
    /// Both axes mirrored (MX | MY), i.e. rotated 180 degrees
    MirrorXY,
    /// Rows and columns exchanged (MV)
    Swap,
    /// Exchanged and columns mirrored (MV | MX), i.e. rotated 90 degrees
    SwapMirrorX,
    /// Exchanged and rows mirrored (MV | MY), i.e. rotated 270 degrees
    SwapMirrorY,
    /// Exchanged and both mirrored (MV | MX | MY)
    SwapMirrorXY,
}

impl Orientation {
    /// MADCTL bits for this orientation
    pub fn bits(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::MirrorX => MADCTL_MX,
            Self::MirrorY => MADCTL_MY,
            Self::MirrorXY => MADCTL_MX | MADCTL_MY,
            Self::Swap => MADCTL_MV,
            Self::SwapMirrorX => MADCTL_MV | MADCTL_MX,
            Self::SwapMirrorY => MADCTL_MV | MADCTL_MY,
            Self::SwapMirrorXY => MADCTL_MV | MADCTL_MX | MADCTL_MY,
        }
    }
}

/// Subpixel order of the panel
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ColorOrder {
    /// Red-green-blue
    #[default]
    Rgb,
    /// Blue-green-red
    Bgr,
}

/// Memory data access control (MADCTL) settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemoryAccess {
    /// Scan orientation
    pub orientation: Orientation,
    /// Refresh lines bottom to top (ML)
    pub vertical_refresh_reversed: bool,
    /// Refresh columns right to left (MH)
    pub horizontal_refresh_reversed: bool,
    /// RGB or BGR subpixel order
    pub color_order: ColorOrder,
}

impl Default for MemoryAccess {
    fn default() -> Self {
        Self {
            orientation: Orientation::Normal,
            // Panel reference setting for 240x240 modules
            vertical_refresh_reversed: true,
            horizontal_refresh_reversed: false,
            color_order: ColorOrder::Rgb,
        }
    }
}

impl MemoryAccess {
    /// Byte written as the MADCTL parameter
    pub fn bits(&self) -> u8 {
        let mut value = self.orientation.bits();
        if self.vertical_refresh_reversed {
            value |= MADCTL_ML;
        }
        if self.horizontal_refresh_reversed {
            value |= MADCTL_MH;
        }
        value
            | match self.color_order {
                ColorOrder::Rgb => MADCTL_RGB,
                ColorOrder::Bgr => MADCTL_BGR,
            }
    }
}

/// Display configuration
///
/// This struct holds all configurable parameters for the ST7789 controller.
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Column offset added to every column address
    pub xstart: u16,
    /// Row offset added to every row address
    pub ystart: u16,
    /// MADCTL settings applied during init
    pub memory_access: MemoryAccess,
    /// COLMOD value applied during init
    pub color_mode: u8,
    /// Color the screen is cleared to at the end of init
    pub clear_color: Color,
    /// Pixels per data transfer when filling
    pub buffer_pixels: usize,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```rust,no_run
/// use st7789_rain::{Builder, Dimensions, Orientation};
///
/// let dims = match Dimensions::new(240, 240) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).orientation(Orientation::Normal).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// Column offset
    xstart: u16,
    /// Row offset
    ystart: u16,
    /// MADCTL settings
    memory_access: MemoryAccess,
    /// COLMOD value
    color_mode: u8,
    /// Clear color used at the end of init
    clear_color: Color,
    /// Pixels per data transfer
    buffer_pixels: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            // 240x240 modules map straight onto frame memory
            xstart: 0,
            ystart: 0,
            memory_access: MemoryAccess::default(),
            // 65K colors, 16 bits per pixel
            color_mode: COLOR_MODE_65K | COLOR_MODE_16BIT,
            clear_color: Color::BLACK,
            buffer_pixels: DEFAULT_BUFFER_PIXELS,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the window origin offset
    ///
    /// Panels smaller than the controller's frame memory (e.g. 135x240)
    /// start at a non-zero column or row.
    pub fn offset(mut self, xstart: u16, ystart: u16) -> Self {
        self.xstart = xstart;
        self.ystart = ystart;
        self
    }

    /// Set all MADCTL settings at once
    pub fn memory_access(mut self, value: MemoryAccess) -> Self {
        self.memory_access = value;
        self
    }

    /// Set scan orientation
    pub fn orientation(mut self, value: Orientation) -> Self {
        self.memory_access.orientation = value;
        self
    }

    /// Set subpixel order
    pub fn color_order(mut self, value: ColorOrder) -> Self {
        self.memory_access.color_order = value;
        self
    }

    /// Set the COLMOD value
    pub fn color_mode(mut self, value: u8) -> Self {
        self.color_mode = value;
        self
    }

    /// Set the color the screen is cleared to during init
    pub fn clear_color(mut self, value: Color) -> Self {
        self.clear_color = value;
        self
    }

    /// Set the fill transfer buffer size in pixels
    pub fn buffer_pixels(mut self, value: usize) -> Self {
        self.buffer_pixels = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::MissingDimensions` if dimensions were not set
    /// - `BuilderError::InvalidOffset` if the offset pushes the panel past
    ///   [`MAX_DIMENSION`]
    /// - `BuilderError::InvalidBufferSize` if the buffer is empty or larger
    ///   than [`MAX_BUFFER_PIXELS`]
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        if u32::from(dimensions.width) + u32::from(self.xstart) > u32::from(MAX_DIMENSION)
            || u32::from(dimensions.height) + u32::from(self.ystart) > u32::from(MAX_DIMENSION)
        {
            return Err(BuilderError::InvalidOffset {
                xstart: self.xstart,
                ystart: self.ystart,
            });
        }
        if self.buffer_pixels == 0 || self.buffer_pixels > MAX_BUFFER_PIXELS {
            return Err(BuilderError::InvalidBufferSize {
                requested: self.buffer_pixels,
            });
        }
        Ok(Config {
            dimensions,
            xstart: self.xstart,
            ystart: self.ystart,
            memory_access: self.memory_access,
            color_mode: self.color_mode,
            clear_color: self.clear_color,
            buffer_pixels: self.buffer_pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_reject_zero_and_oversize() {
        assert!(Dimensions::new(0, 240).is_err());
        assert!(Dimensions::new(240, 0).is_err());
        assert!(Dimensions::new(321, 240).is_err());
        assert_eq!(Dimensions::new(240, 240).unwrap().area(), 57_600);
    }

    #[test]
    fn test_build_requires_dimensions() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn test_offset_past_frame_memory_rejected() {
        let result = Builder::new()
            .dimensions(Dimensions::new(240, 240).unwrap())
            .offset(0, 81)
            .build();
        assert_eq!(
            result.err(),
            Some(BuilderError::InvalidOffset {
                xstart: 0,
                ystart: 81
            })
        );

        let result = Builder::new()
            .dimensions(Dimensions::new(135, 240).unwrap())
            .offset(52, 40)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_buffer_size_bounds() {
        let dims = Dimensions::new(240, 240).unwrap();
        assert_eq!(
            Builder::new().dimensions(dims).buffer_pixels(0).build().err(),
            Some(BuilderError::InvalidBufferSize { requested: 0 })
        );
        assert!(
            Builder::new()
                .dimensions(dims)
                .buffer_pixels(MAX_BUFFER_PIXELS + 1)
                .build()
                .is_err()
        );
        let config = Builder::new().dimensions(dims).build().unwrap();
        assert_eq!(config.buffer_pixels, DEFAULT_BUFFER_PIXELS);
    }

    #[test]
    fn test_default_memory_access_byte() {
        assert_eq!(MemoryAccess::default().bits(), MADCTL_ML);
    }

    #[test]
    fn test_memory_access_combines_bits() {
        let access = MemoryAccess {
            orientation: Orientation::SwapMirrorX,
            vertical_refresh_reversed: false,
            horizontal_refresh_reversed: true,
            color_order: ColorOrder::Bgr,
        };
        assert_eq!(access.bits(), MADCTL_MV | MADCTL_MX | MADCTL_MH | MADCTL_BGR);
    }

    #[test]
    fn test_orientation_bits() {
        assert_eq!(Orientation::Normal.bits(), 0x00);
        assert_eq!(Orientation::MirrorXY.bits(), 0xC0);
        assert_eq!(Orientation::SwapMirrorXY.bits(), 0xE0);
    }
}
