//! Bounded random numbers for the animation
//!
//! [`RandomSource`] wraps any [`RngCore`] and derives integers, floats and
//! picks from fixed-width random bit fields. It is deterministic for a given
//! seed, which keeps the animation reproducible in tests.
//!
//! ```
//! use st7789_rain::RandomSource;
//!
//! let mut rng = RandomSource::seeded(7);
//! let speed = rng.random_int(1, 3);
//! assert!((1..=3).contains(&speed));
//! assert!(rng.random_float() < 1.0);
//! ```

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Width of the bit field behind [`RandomSource::random_int`]
pub const INT_FIELD_BITS: u32 = 32;

/// Width of the bit field behind [`RandomSource::random_float`]
pub const FLOAT_FIELD_BITS: u32 = 24;

/// Deterministic source of bounded random values
#[derive(Clone, Debug)]
pub struct RandomSource<R = SmallRng> {
    rng: R,
}

impl RandomSource<SmallRng> {
    /// Source backed by a `SmallRng` seeded with `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> RandomSource<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform integer in `min..=max`
    ///
    /// A 32-bit field is divided by `2^32 / span`; results that land in the
    /// short tail past `max` are redrawn, so the value is always in range.
    /// This is not a cryptographic generator. A reversed range is swapped.
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        let divisor = (1u64 << INT_FIELD_BITS) / span;
        loop {
            let value = u64::from(self.rng.next_u32()) / divisor;
            if value < span {
                return (i64::from(min) + value as i64) as i32;
            }
        }
    }

    /// Uniform float in `[0, 1)`
    pub fn random_float(&mut self) -> f32 {
        let field = self.rng.next_u32() >> (32 - FLOAT_FIELD_BITS);
        field as f32 / (1u32 << FLOAT_FIELD_BITS) as f32
    }

    /// Uniform pick from `items`, `None` when empty
    pub fn random_choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let last = i32::try_from(items.len() - 1).unwrap_or(i32::MAX);
        items.get(self.random_int(0, last) as usize)
    }

    /// `true` with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.random_float() < p
    }
}
