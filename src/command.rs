//! ST7789 command definitions
//!
//! This module defines the command bytes and parameter bits used to control
//! the ST7789 LCD controller. Commands are sent over SPI with the DC pin low
//! for commands and high for data.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Assert CS (Chip Select)
//! 2. Set DC low (command mode)
//! 3. Send command byte
//! 4. Set DC high (data mode)
//! 5. Send data bytes (if any)
//! 6. Deassert CS
//!
//! ## Example
//!
//! ```rust,no_run
//! use st7789_rain::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin);
//! // Soft reset
//! let _ = interface.write(Some(command::SWRESET), None);
//!
//! // Select 16 bits per pixel
//! let _ = interface.write(
//!     Some(command::COLMOD),
//!     Some(&[command::COLOR_MODE_65K | command::COLOR_MODE_16BIT]),
//! );
//! ```

// System control commands

/// No operation (0x00)
pub const NOP: u8 = 0x00;

/// Software reset command (0x01)
///
/// Resets registers to their default values. Wait 150ms before the next command.
pub const SWRESET: u8 = 0x01;

/// Sleep in command (0x10)
///
/// Enters minimum power mode. The DC/DC converter and oscillator stop.
pub const SLPIN: u8 = 0x10;

/// Sleep out command (0x11)
///
/// Leaves sleep mode. Wait at least 5ms (we use 50ms) before the next command.
pub const SLPOUT: u8 = 0x11;

// Display mode commands

/// Display inversion off command (0x20)
pub const INVOFF: u8 = 0x20;

/// Display inversion on command (0x21)
///
/// Most IPS panels driven by the ST7789 need inversion on for correct colors.
pub const INVON: u8 = 0x21;

/// Display off command (0x28)
///
/// Blanks the panel output. Frame memory is kept.
pub const DISPOFF: u8 = 0x28;

/// Display on command (0x29)
pub const DISPON: u8 = 0x29;

// Memory addressing commands

/// Column address set command (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const CASET: u8 = 0x2A;

/// Row address set command (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB]
pub const RASET: u8 = 0x2B;

/// Memory write command (0x2C)
///
/// Following data bytes fill the current window in row-major order,
/// 2 bytes (RGB565, big-endian) per pixel.
pub const RAMWR: u8 = 0x2C;

/// Memory data access control command (0x36)
///
/// Requires 1 byte built from the `MADCTL_*` bits.
pub const MADCTL: u8 = 0x36;

/// Interface pixel format command (0x3A)
///
/// Requires 1 byte built from the `COLOR_MODE_*` values.
pub const COLMOD: u8 = 0x3A;

// MADCTL bits

/// Page (row) address order, bottom to top
pub const MADCTL_MY: u8 = 0x80;
/// Column address order, right to left
pub const MADCTL_MX: u8 = 0x40;
/// Page/column exchange (swap X and Y)
pub const MADCTL_MV: u8 = 0x20;
/// Line address order (vertical refresh direction)
pub const MADCTL_ML: u8 = 0x10;
/// BGR color order
pub const MADCTL_BGR: u8 = 0x08;
/// Display data latch order (horizontal refresh direction)
pub const MADCTL_MH: u8 = 0x04;
/// RGB color order
pub const MADCTL_RGB: u8 = 0x00;

// COLMOD values

/// 65K color RGB interface
pub const COLOR_MODE_65K: u8 = 0x50;
/// 16 bits per pixel control interface
pub const COLOR_MODE_16BIT: u8 = 0x05;
/// Mask of the bits COLMOD actually uses
pub const COLOR_MODE_MASK: u8 = 0x77;
