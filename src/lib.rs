//! ST7789 LCD Driver with a Falling-Character Rain Animation
//!
//! A driver for the ST7789 TFT controller over SPI, plus a "digital rain"
//! animation that streams green character trails down the screen.
//!
//! ## Features
//!
//! - `no_std` compatible, no heap required
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Configurable panel size, window offset and MADCTL settings
//! - Chunked rectangle fills with a bounded transfer buffer
//! - Built-in 8×8 bitmap font for digits and a few letters
//! - Rain engine with a fixed-capacity drop pool and a seeded RNG
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use st7789_rain::{Builder, Color, Dimensions, Display, Interface, Orientation, font};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst);
//! let dims = match Dimensions::new(240, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).orientation(Orientation::Normal).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = Display::new(interface, config);
//! let _ = display.init(&mut delay);
//! let _ = display.fill_rect(10, 10, 40, 20, Color::BLUE);
//! let _ = display.text(10, 40, "SP:3", Color::GREEN, None, 2, font::SIZE_8X8);
//! ```
//!
//! See [`rain`] for running the animation.

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// RGB565 colors
pub mod color;
/// ST7789 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Built-in bitmap fonts
pub mod font;
/// Hardware interface abstraction
pub mod interface;
/// Falling-character rain animation
pub mod rain;
/// Bounded random numbers
pub mod rng;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::{Color, color565};
pub use config::{
    Builder, ColorOrder, Config, DEFAULT_BUFFER_PIXELS, Dimensions, MAX_BUFFER_PIXELS,
    MAX_DIMENSION, MemoryAccess, Orientation,
};
pub use display::{Display, InitStep, PowerState};
pub use error::{BuilderError, Error};
pub use font::{Font, FontSize};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface};
pub use rain::{DropPool, Palette, Rain, RainBuilder, RainConfig, RainDrop};
pub use rng::RandomSource;
