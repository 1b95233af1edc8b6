//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! Out-of-bounds drawing is not an error: a window that does not fit the
//! panel is dropped without touching the bus.
//!
//! ## Example
//!
//! ```
//! use st7789_rain::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(400, 240); // Too wide
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;

/// Largest column or row count addressable by the ST7789 frame memory
pub const MAX_DIMENSION: u16 = 320;

/// Largest transfer buffer, in pixels, that [`Builder`](crate::Builder) accepts
pub const MAX_BUFFER_PIXELS: usize = 512;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display or the
/// animation is created.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels requested
        width: u16,
        /// Height in pixels requested
        height: u16,
    },
    /// Window origin offset pushes the panel past the frame memory
    InvalidOffset {
        /// Column offset requested
        xstart: u16,
        /// Row offset requested
        ystart: u16,
    },
    /// Transfer buffer size is zero or larger than [`MAX_BUFFER_PIXELS`]
    InvalidBufferSize {
        /// Requested size in pixels
        requested: usize,
    },
    /// Drop population limits are inconsistent or exceed pool capacity
    InvalidPopulation {
        /// Drops spawned at start
        initial: usize,
        /// Population cap
        max: usize,
    },
    /// An inclusive range has `min > max` or exceeds its hard limit
    InvalidRange {
        /// Name of the offending parameter
        name: &'static str,
        /// Requested lower bound
        min: i32,
        /// Requested upper bound
        max: i32,
    },
    /// A probability outside `0.0..=1.0`
    InvalidProbability {
        /// Name of the offending parameter
        name: &'static str,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_DIMENSION}x{MAX_DIMENSION})"
            ),
            Self::InvalidOffset { xstart, ystart } => {
                write!(f, "Invalid window offset ({xstart}, {ystart})")
            }
            Self::InvalidBufferSize { requested } => write!(
                f,
                "Invalid buffer size {requested} pixels (must be 1..={MAX_BUFFER_PIXELS})"
            ),
            Self::InvalidPopulation { initial, max } => {
                write!(f, "Invalid drop population: initial {initial}, max {max}")
            }
            Self::InvalidRange { name, min, max } => {
                write!(f, "Invalid range for {name}: {min}..={max}")
            }
            Self::InvalidProbability { name } => {
                write!(f, "Probability {name} must be within 0.0..=1.0")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
