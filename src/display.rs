//! Core display operations

use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::command::{
    CASET, COLMOD, COLOR_MODE_MASK, DISPOFF, DISPON, INVOFF, INVON, MADCTL, RAMWR, RASET, SLPIN,
    SLPOUT, SWRESET,
};
use crate::config::{Config, Dimensions, MemoryAccess};
use crate::error::{Error, MAX_BUFFER_PIXELS};
use crate::font::{Font, FontSize};
use crate::interface::DisplayInterface;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Wait after `SWRESET`
pub const SOFT_RESET_DELAY_MS: u32 = 150;
/// Wait after `SLPOUT`
pub const SLEEP_OUT_DELAY_MS: u32 = 50;
/// Wait after `SLPIN`
pub const SLEEP_IN_DELAY_MS: u32 = 5;
/// Wait after `COLMOD`
pub const COLOR_MODE_DELAY_MS: u32 = 50;
/// Wait after `INVON`
pub const INVERSION_DELAY_MS: u32 = 10;
/// Wait after `DISPON`
pub const DISPLAY_ON_DELAY_MS: u32 = 100;

/// Steps of the power-up sequence, in the order they run
///
/// The sequence is linear: every step runs exactly once, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// Pulse the reset line
    HardwareReset,
    /// `SWRESET`
    SoftwareReset,
    /// `SLPOUT`
    SleepOut,
    /// `COLMOD`
    SetColorMode,
    /// `MADCTL`
    SetMemoryAccessMode,
    /// `INVON`
    InversionOn,
    /// `DISPON`
    DisplayOn,
    /// Fill with the configured clear color
    Clear,
}

impl InitStep {
    /// First step of the sequence
    pub const FIRST: Self = Self::HardwareReset;

    /// Step that follows this one, `None` after the last
    pub fn next(self) -> Option<Self> {
        match self {
            Self::HardwareReset => Some(Self::SoftwareReset),
            Self::SoftwareReset => Some(Self::SleepOut),
            Self::SleepOut => Some(Self::SetColorMode),
            Self::SetColorMode => Some(Self::SetMemoryAccessMode),
            Self::SetMemoryAccessMode => Some(Self::InversionOn),
            Self::InversionOn => Some(Self::DisplayOn),
            Self::DisplayOn => Some(Self::Clear),
            Self::Clear => None,
        }
    }
}

/// Controller power state as seen by the driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PowerState {
    /// Not initialized yet
    #[default]
    Idle,
    /// Init sequence running; holds the step in progress
    Initializing(InitStep),
    /// Initialized and drawing
    Ready,
    /// In sleep mode after [`Display::sleep`]
    Sleeping,
}

/// Core display driver for the ST7789
///
/// Owns the interface and the panel geometry. All drawing goes through
/// [`fill_rect`](Self::fill_rect), which streams pixels in bounded chunks.
/// With the `graphics` feature it is also an embedded-graphics `DrawTarget`.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Power state
    state: PowerState,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    ///
    /// Nothing is sent until [`init`](Self::init) is called.
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            state: PowerState::Idle,
        }
    }

    /// Run the full power-up sequence and clear the screen
    ///
    /// Hardware reset, software reset, sleep out, color mode, memory access
    /// mode, inversion on, display on, clear. Each step waits a fixed time
    /// required by the controller.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        let mut step = Some(InitStep::FIRST);
        while let Some(current) = step {
            self.state = PowerState::Initializing(current);
            log::debug!("st7789 init: {:?}", current);
            self.run_step(current, delay)?;
            step = current.next();
        }
        self.state = PowerState::Ready;
        log::debug!("st7789 ready");
        Ok(())
    }

    fn run_step<D: DelayNs>(&mut self, step: InitStep, delay: &mut D) -> DisplayResult<I> {
        match step {
            InitStep::HardwareReset => {
                self.interface.reset(delay).map_err(Error::Interface)?;
            }
            InitStep::SoftwareReset => {
                self.write(Some(SWRESET), None)?;
                delay.delay_ms(SOFT_RESET_DELAY_MS);
            }
            InitStep::SleepOut => {
                self.write(Some(SLPOUT), None)?;
                delay.delay_ms(SLEEP_OUT_DELAY_MS);
            }
            InitStep::SetColorMode => {
                self.set_color_mode(self.config.color_mode)?;
                delay.delay_ms(COLOR_MODE_DELAY_MS);
            }
            InitStep::SetMemoryAccessMode => {
                self.set_memory_access(self.config.memory_access)?;
            }
            InitStep::InversionOn => {
                self.write(Some(INVON), None)?;
                delay.delay_ms(INVERSION_DELAY_MS);
            }
            InitStep::DisplayOn => {
                self.write(Some(DISPON), None)?;
                delay.delay_ms(DISPLAY_ON_DELAY_MS);
            }
            InitStep::Clear => {
                self.fill(self.config.clear_color)?;
            }
        }
        Ok(())
    }

    /// Set the interface pixel format (COLMOD)
    ///
    /// Only the bits the controller uses are sent.
    pub fn set_color_mode(&mut self, mode: u8) -> DisplayResult<I> {
        self.write(Some(COLMOD), Some(&[mode & COLOR_MODE_MASK]))
    }

    /// Set orientation, refresh order and color order (MADCTL)
    ///
    /// Changing the orientation does not change the configured dimensions;
    /// swap them in the [`Config`] when exchanging rows and columns.
    pub fn set_memory_access(&mut self, access: MemoryAccess) -> DisplayResult<I> {
        self.config.memory_access = access;
        self.write(Some(MADCTL), Some(&[access.bits()]))
    }

    /// Turn display inversion on or off
    pub fn set_inversion(&mut self, inverted: bool) -> DisplayResult<I> {
        self.write(Some(if inverted { INVON } else { INVOFF }), None)
    }

    /// Turn the panel output on
    pub fn display_on(&mut self) -> DisplayResult<I> {
        self.write(Some(DISPON), None)
    }

    /// Blank the panel output, keeping frame memory
    pub fn display_off(&mut self) -> DisplayResult<I> {
        self.write(Some(DISPOFF), None)
    }

    /// Enter sleep mode
    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.write(Some(SLPIN), None)?;
        delay.delay_ms(SLEEP_IN_DELAY_MS);
        self.state = PowerState::Sleeping;
        Ok(())
    }

    /// Leave sleep mode
    pub fn wake<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        self.write(Some(SLPOUT), None)?;
        delay.delay_ms(SLEEP_OUT_DELAY_MS);
        self.state = PowerState::Ready;
        Ok(())
    }

    /// Address a window and start a memory write
    ///
    /// Requires `x0 <= x1 < width` and `y0 <= y1 < height`. A window that
    /// breaks either bound, or whose address overflows once the offset is
    /// added, is dropped without any bus traffic and `false` is
    /// returned. Otherwise `CASET`, `RASET` (shifted by the configured
    /// offset) and `RAMWR` are sent; the caller must then supply exactly
    /// `(x1 - x0 + 1) * (y1 - y0 + 1)` pixels.
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<bool, Error<I>> {
        let Dimensions { width, height } = self.config.dimensions;
        if x0 > x1 || x1 >= width || y0 > y1 || y1 >= height {
            log::trace!("window ({x0},{y0})-({x1},{y1}) outside {width}x{height}, dropped");
            return Ok(false);
        }
        let (xs, ys) = (self.config.xstart, self.config.ystart);
        let (Some(col0), Some(col1), Some(row0), Some(row1)) = (
            x0.checked_add(xs),
            x1.checked_add(xs),
            y0.checked_add(ys),
            y1.checked_add(ys),
        ) else {
            log::trace!("window offset ({xs},{ys}) overflows, dropped");
            return Ok(false);
        };
        self.write(Some(CASET), Some(&encode_range(col0, col1)))?;
        self.write(Some(RASET), Some(&encode_range(row0, row1)))?;
        self.write(Some(RAMWR), None)?;
        Ok(true)
    }

    /// Set a single pixel
    pub fn pixel(&mut self, x: u16, y: u16, color: Color) -> DisplayResult<I> {
        if self.set_window(x, y, x, y)? {
            self.write(None, Some(&color.to_be_bytes()))?;
        }
        Ok(())
    }

    /// Fill a rectangle with one color
    ///
    /// The `w * h` pixels are sent as whole transfers of the configured
    /// buffer size followed by one transfer of the remainder, so memory use
    /// does not grow with the rectangle. Empty or out-of-bounds rectangles
    /// are ignored.
    #[allow(clippy::many_single_char_names)]
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> DisplayResult<I> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let (Some(x1), Some(y1)) = (x.checked_add(w - 1), y.checked_add(h - 1)) else {
            return Ok(());
        };
        if !self.set_window(x, y, x1, y1)? {
            return Ok(());
        }

        let pixels = usize::from(w) * usize::from(h);
        let chunk = self.config.buffer_pixels.clamp(1, MAX_BUFFER_PIXELS);
        let mut buffer = [0u8; MAX_BUFFER_PIXELS * 2];
        let encoded = color.to_be_bytes();
        for cell in buffer[..chunk.min(pixels) * 2].chunks_exact_mut(2) {
            cell.copy_from_slice(&encoded);
        }

        let (chunks, rest) = (pixels / chunk, pixels % chunk);
        for _ in 0..chunks {
            self.write(None, Some(&buffer[..chunk * 2]))?;
        }
        if rest > 0 {
            self.write(None, Some(&buffer[..rest * 2]))?;
        }
        Ok(())
    }

    /// Fill the whole screen
    pub fn fill(&mut self, color: Color) -> DisplayResult<I> {
        let Dimensions { width, height } = self.config.dimensions;
        self.fill_rect(0, 0, width, height, color)
    }

    /// Draw a string with a built-in bitmap font
    ///
    /// Every glyph bit becomes a `scale`×`scale` rectangle: `color` where the
    /// bit is set, `background` where it is clear (skipped when `None`).
    /// The cursor advances one cell width times `scale` per character.
    /// Characters without a glyph render as spaces. A font size with no
    /// built-in table makes the whole call a no-op.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        color: Color,
        background: Option<Color>,
        scale: u16,
        font: FontSize,
    ) -> DisplayResult<I> {
        let Some(font) = Font::lookup(font) else {
            log::trace!("no font for {}x{}, text skipped", font.width, font.height);
            return Ok(());
        };
        let advance = u32::from(font.size().width) * u32::from(scale);
        let mut cursor = u32::from(x);
        for ch in text.chars() {
            let Ok(cell_x) = u16::try_from(cursor) else {
                break;
            };
            self.draw_glyph(font, cell_x, y, ch, color, background, scale)?;
            cursor += advance;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_glyph(
        &mut self,
        font: &Font,
        x: u16,
        y: u16,
        ch: char,
        color: Color,
        background: Option<Color>,
        scale: u16,
    ) -> DisplayResult<I> {
        let glyph = font.glyph(ch);
        let size = font.size();
        for (row, line) in glyph.iter().enumerate().take(usize::from(size.height)) {
            let Ok(py) = u16::try_from(u32::from(y) + row as u32 * u32::from(scale)) else {
                break;
            };
            for col in 0..u32::from(size.width) {
                let Ok(px) = u16::try_from(u32::from(x) + col * u32::from(scale)) else {
                    break;
                };
                let fill = if line & (0x80 >> col) != 0 {
                    color
                } else if let Some(background) = background {
                    background
                } else {
                    continue;
                };
                self.fill_rect(px, py, scale, scale, fill)?;
            }
        }
        Ok(())
    }

    /// Send one framed transaction to the controller
    fn write(&mut self, command: Option<u8>, data: Option<&[u8]>) -> DisplayResult<I> {
        self.interface
            .write(command, data)
            .map_err(Error::Interface)
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current power state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Whether [`init`](Self::init) completed
    pub fn is_ready(&self) -> bool {
        self.state == PowerState::Ready
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }
}

/// Start/end address pair as two big-endian u16 values
fn encode_range(start: u16, end: u16) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}
