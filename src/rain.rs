//! Falling-character rain animation
//!
//! The screen is divided into 8×8 character cells. A [`RainDrop`] is a
//! vertical trail of characters in one column whose head moves down one row
//! every `speed` frames. Drops that fall past the bottom are replaced in
//! place by a new drop entering from above, and new drops are occasionally
//! added until the pool is full.
//!
//! Each frame draws every drop, then updates every drop, then applies the
//! recycle and growth policies. Trails are drawn with an opaque background,
//! so cells left behind are erased without clearing the whole screen.
//!
//! ## Example
//!
//! ```rust,no_run
//! use core::sync::atomic::AtomicBool;
//! use st7789_rain::{Builder, Dimensions, Display, Interface, Rain, RainBuilder, RandomSource};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! static STOP: AtomicBool = AtomicBool::new(false);
//!
//! let interface = Interface::new(MockSpi, MockPin, MockPin);
//! let dims = match Dimensions::new(240, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut display = Display::new(interface, config);
//! let _ = display.init(&mut delay);
//!
//! let rain_config = match RainBuilder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut rain = Rain::new(rain_config, RandomSource::seeded(0x5EED), &dims);
//!
//! // Runs until STOP is set, then clears the screen
//! let _ = rain.run(&mut display, &STOP);
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use rand::RngCore;
use rand::rngs::SmallRng;

use crate::color::Color;
use crate::config::Dimensions;
use crate::display::Display;
use crate::error::{BuilderError, Error};
use crate::font::{CHARSET, SIZE_8X8};
use crate::interface::DisplayInterface;
use crate::rng::RandomSource;

type RainResult<I> = core::result::Result<(), Error<I>>;

/// Side of one character cell in pixels
pub const CELL_SIZE: u16 = 8;

/// Most drops a pool can ever hold
pub const POOL_CAPACITY: usize = 64;

/// Longest trail a drop can carry
pub const MAX_TRAIL_LENGTH: usize = 32;

/// Trail colors by distance from the head
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Head character
    pub head: Color,
    /// Characters 1 and 2 behind the head
    pub near: Color,
    /// Characters 3 and 4 behind the head
    pub mid: Color,
    /// Everything further back
    pub tail: Color,
    /// Cell background, also the screen clear color
    pub background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Color::from_rgb(0, 255, 0),
            near: Color::from_rgb(0, 200, 0),
            mid: Color::from_rgb(0, 150, 0),
            tail: Color::from_rgb(0, 100, 0),
            background: Color::BLACK,
        }
    }
}

impl Palette {
    /// Color of the trail character `index` places behind the head
    pub fn for_index(&self, index: usize) -> Color {
        match index {
            0 => self.head,
            1..=2 => self.near,
            3..=4 => self.mid,
            _ => self.tail,
        }
    }
}

/// Animation policy
///
/// All ranges are inclusive. Use [`RainBuilder`] to create one.
#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    /// Drops spawned when the animation starts
    pub initial_drops: usize,
    /// Population cap
    pub max_drops: usize,
    /// Chance that an advancing drop rotates in a new head character
    pub mutation_chance: f32,
    /// Chance per frame of adding one drop
    pub spawn_chance: f32,
    /// Frames per row advance
    pub speed: (i32, i32),
    /// Trail length in characters
    pub length: (i32, i32),
    /// Head row of the initial drops
    pub start_rows: (i32, i32),
    /// Head row of drops added by the growth policy
    pub growth_rows: (i32, i32),
    /// Trail colors
    pub palette: Palette,
}

/// Builder for [`RainConfig`]
///
/// # Example
///
/// ```
/// use st7789_rain::RainBuilder;
///
/// let config = RainBuilder::new().max_drops(40).spawn_chance(0.2).build();
/// assert!(config.is_ok());
///
/// // More initial drops than the cap allows
/// assert!(RainBuilder::new().initial_drops(60).max_drops(50).build().is_err());
/// ```
#[must_use]
pub struct RainBuilder {
    config: RainConfig,
}

impl Default for RainBuilder {
    fn default() -> Self {
        Self {
            config: RainConfig {
                initial_drops: 30,
                max_drops: 50,
                mutation_chance: 0.3,
                spawn_chance: 0.1,
                speed: (1, 3),
                length: (5, 15),
                // Enter from above the screen
                start_rows: (-20, 0),
                growth_rows: (-5, -1),
                palette: Palette::default(),
            },
        }
    }
}

impl RainBuilder {
    /// Create a new RainBuilder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of drops spawned at start
    pub fn initial_drops(mut self, value: usize) -> Self {
        self.config.initial_drops = value;
        self
    }

    /// Set the population cap
    pub fn max_drops(mut self, value: usize) -> Self {
        self.config.max_drops = value;
        self
    }

    /// Set the per-advance character mutation chance
    pub fn mutation_chance(mut self, value: f32) -> Self {
        self.config.mutation_chance = value;
        self
    }

    /// Set the per-frame spawn chance
    pub fn spawn_chance(mut self, value: f32) -> Self {
        self.config.spawn_chance = value;
        self
    }

    /// Set the speed range (frames per row)
    pub fn speed(mut self, min: i32, max: i32) -> Self {
        self.config.speed = (min, max);
        self
    }

    /// Set the trail length range
    pub fn length(mut self, min: i32, max: i32) -> Self {
        self.config.length = (min, max);
        self
    }

    /// Set the head row range for initial drops
    pub fn start_rows(mut self, min: i32, max: i32) -> Self {
        self.config.start_rows = (min, max);
        self
    }

    /// Set the head row range for drops added while running
    pub fn growth_rows(mut self, min: i32, max: i32) -> Self {
        self.config.growth_rows = (min, max);
        self
    }

    /// Set the trail colors
    pub fn palette(mut self, value: Palette) -> Self {
        self.config.palette = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::InvalidPopulation` if `max_drops` exceeds
    ///   [`POOL_CAPACITY`] or `initial_drops` exceeds `max_drops`
    /// - `BuilderError::InvalidRange` for an empty range, a speed outside
    ///   `1..=255` or a length outside `1..=MAX_TRAIL_LENGTH`
    /// - `BuilderError::InvalidProbability` for a chance outside `0.0..=1.0`
    pub fn build(self) -> Result<RainConfig, BuilderError> {
        let config = self.config;
        if config.max_drops > POOL_CAPACITY || config.initial_drops > config.max_drops {
            return Err(BuilderError::InvalidPopulation {
                initial: config.initial_drops,
                max: config.max_drops,
            });
        }
        check_range("speed", config.speed, 1, i32::from(u8::MAX))?;
        check_range("length", config.length, 1, MAX_TRAIL_LENGTH as i32)?;
        check_range("start_rows", config.start_rows, i32::MIN, i32::MAX)?;
        check_range("growth_rows", config.growth_rows, i32::MIN, i32::MAX)?;
        check_probability("mutation_chance", config.mutation_chance)?;
        check_probability("spawn_chance", config.spawn_chance)?;
        Ok(config)
    }
}

fn check_range(
    name: &'static str,
    (min, max): (i32, i32),
    floor: i32,
    ceiling: i32,
) -> Result<(), BuilderError> {
    if min > max || min < floor || max > ceiling {
        return Err(BuilderError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn check_probability(name: &'static str, value: f32) -> Result<(), BuilderError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BuilderError::InvalidProbability { name });
    }
    Ok(())
}

/// One falling character trail
///
/// The column and trail length are fixed for the drop's lifetime; the head
/// row only ever increases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainDrop {
    x: u16,
    y: i32,
    speed: u8,
    length: u8,
    chars: [u8; MAX_TRAIL_LENGTH],
    counter: u8,
}

impl RainDrop {
    /// Create a drop with `length` random characters
    ///
    /// `speed` is raised to at least 1 and `length` is clamped to
    /// `1..=MAX_TRAIL_LENGTH`.
    pub fn new<R: RngCore>(
        x: u16,
        y: i32,
        speed: u8,
        length: usize,
        rng: &mut RandomSource<R>,
    ) -> Self {
        let length = length.clamp(1, MAX_TRAIL_LENGTH);
        let mut chars = [b' '; MAX_TRAIL_LENGTH];
        for ch in &mut chars[..length] {
            *ch = random_char(rng);
        }
        Self {
            x,
            y,
            speed: speed.max(1),
            length: length as u8,
            chars,
            counter: 0,
        }
    }

    /// Column, in cells
    pub fn x(&self) -> u16 {
        self.x
    }

    /// Head row, in cells; negative while above the screen
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Frames per row advance
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Trail length in characters
    pub fn length(&self) -> usize {
        usize::from(self.length)
    }

    /// Trail characters, head first
    pub fn chars(&self) -> &[u8] {
        &self.chars[..self.length()]
    }

    /// Row just above the last trail character
    pub fn tail_row(&self) -> i32 {
        self.y - i32::from(self.length)
    }

    /// Whether the whole trail is below `last_row`
    pub fn has_passed(&self, last_row: i32) -> bool {
        self.tail_row() > last_row
    }

    /// Advance one frame
    ///
    /// Every `speed` frames the head moves down one row and, with
    /// probability `mutation_chance`, the trail shifts by one: the tail
    /// character drops off and a new random character becomes the head.
    /// Returns whether the head moved.
    pub fn update<R: RngCore>(&mut self, rng: &mut RandomSource<R>, mutation_chance: f32) -> bool {
        self.counter = self.counter.saturating_add(1);
        if self.counter < self.speed {
            return false;
        }
        self.counter = 0;
        self.y += 1;
        if rng.chance(mutation_chance) {
            let length = self.length();
            self.chars.copy_within(0..length - 1, 1);
            self.chars[0] = random_char(rng);
        }
        true
    }

    /// Draw the visible part of the trail
    ///
    /// `rows` is the number of character rows on screen.
    pub fn draw<I: DisplayInterface>(
        &self,
        display: &mut Display<I>,
        rows: i32,
        palette: &Palette,
    ) -> RainResult<I> {
        let Some(px) = self.x.checked_mul(CELL_SIZE) else {
            return Ok(());
        };
        for (index, &ch) in self.chars().iter().enumerate() {
            let row = self.y - index as i32;
            if !(0..rows).contains(&row) {
                continue;
            }
            let Ok(py) = u16::try_from(row * i32::from(CELL_SIZE)) else {
                continue;
            };
            let mut utf8 = [0u8; 4];
            let text = char::from(ch).encode_utf8(&mut utf8);
            display.text(
                px,
                py,
                text,
                palette.for_index(index),
                Some(palette.background),
                1,
                SIZE_8X8,
            )?;
        }
        Ok(())
    }
}

fn random_char<R: RngCore>(rng: &mut RandomSource<R>) -> u8 {
    rng.random_choice(CHARSET).copied().unwrap_or(b' ')
}

/// Fixed-capacity set of live drops
///
/// Storage never grows past [`POOL_CAPACITY`]; recycled drops reuse their
/// slot.
#[derive(Clone, Debug)]
pub struct DropPool {
    drops: heapless::Vec<RainDrop, POOL_CAPACITY>,
    max: usize,
}

impl DropPool {
    /// Empty pool holding at most `max` drops
    pub fn new(max: usize) -> Self {
        Self {
            drops: heapless::Vec::new(),
            max: max.min(POOL_CAPACITY),
        }
    }

    /// Number of live drops
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// Whether the pool has no drops
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Population cap
    pub fn max(&self) -> usize {
        self.max
    }

    /// Whether the cap has been reached
    pub fn is_full(&self) -> bool {
        self.drops.len() >= self.max
    }

    /// Add a drop; returns `false` when the pool is full
    pub fn push(&mut self, drop: RainDrop) -> bool {
        if self.is_full() {
            return false;
        }
        self.drops.push(drop).is_ok()
    }

    /// Live drops
    pub fn iter(&self) -> impl Iterator<Item = &RainDrop> {
        self.drops.iter()
    }

    /// Remove every drop
    pub fn clear(&mut self) {
        self.drops.clear();
    }
}

/// The rain animation engine
///
/// Owns the drop pool and the random source. It borrows the [`Display`]
/// for each frame.
pub struct Rain<R = SmallRng> {
    config: RainConfig,
    rng: RandomSource<R>,
    pool: DropPool,
    columns: u16,
    rows: u16,
    frames: u64,
}

impl<R: RngCore> Rain<R> {
    /// Create an engine for a panel of the given size
    ///
    /// The pool starts empty; [`populate`](Self::populate) or
    /// [`run`](Self::run) fills it. [`run`](Self::run) and
    /// [`frame`](Self::frame) take the cell grid from the display they draw
    /// on, so `dimensions` only matters for direct `populate`/`advance` use.
    pub fn new(config: RainConfig, rng: RandomSource<R>, dimensions: &Dimensions) -> Self {
        let pool = DropPool::new(config.max_drops);
        let mut rain = Self {
            config,
            rng,
            pool,
            columns: 1,
            rows: 1,
            frames: 0,
        };
        rain.resize(dimensions);
        rain
    }

    /// Set the cell grid from a panel size
    ///
    /// Live drops keep their column; one outside the new grid is recycled
    /// once it falls past the bottom.
    pub fn resize(&mut self, dimensions: &Dimensions) {
        self.columns = (dimensions.width / CELL_SIZE).max(1);
        self.rows = (dimensions.height / CELL_SIZE).max(1);
    }

    /// Replace the pool contents with the initial population
    pub fn populate(&mut self) {
        self.pool.clear();
        for _ in 0..self.config.initial_drops {
            let (min, max) = self.config.start_rows;
            let y = self.rng.random_int(min, max);
            let drop = spawn(&mut self.rng, &self.config, self.columns, y, None);
            if !self.pool.push(drop) {
                break;
            }
        }
    }

    /// Draw every live drop
    pub fn draw<I: DisplayInterface>(&self, display: &mut Display<I>) -> RainResult<I> {
        let rows = i32::from(self.rows);
        for drop in self.pool.iter() {
            drop.draw(display, rows, &self.config.palette)?;
        }
        Ok(())
    }

    /// Update every drop, recycle the ones that left the screen and maybe
    /// add one more
    pub fn advance(&mut self) {
        let last_row = i32::from(self.rows) - 1;
        for drop in &mut self.pool.drops {
            if drop.update(&mut self.rng, self.config.mutation_chance) && drop.has_passed(last_row) {
                let length = drop.length();
                *drop = spawn(
                    &mut self.rng,
                    &self.config,
                    self.columns,
                    -(length as i32),
                    Some(length),
                );
            }
        }

        if self.rng.chance(self.config.spawn_chance) && !self.pool.is_full() {
            let (min, max) = self.config.growth_rows;
            let y = self.rng.random_int(min, max);
            let drop = spawn(&mut self.rng, &self.config, self.columns, y, None);
            self.pool.push(drop);
        }
        self.frames += 1;
    }

    /// Draw, then advance
    pub fn frame<I: DisplayInterface>(&mut self, display: &mut Display<I>) -> RainResult<I> {
        self.resize(display.dimensions());
        self.draw(display)?;
        self.advance();
        Ok(())
    }

    /// Run frames until `stop` is set
    ///
    /// Clears the screen and spawns the initial population first. `stop` is
    /// checked between frames. On the way out the screen is cleared again,
    /// also when a frame failed; the first error is returned.
    pub fn run<I: DisplayInterface>(
        &mut self,
        display: &mut Display<I>,
        stop: &AtomicBool,
    ) -> RainResult<I> {
        self.resize(display.dimensions());
        log::debug!(
            "rain start: {}x{} cells, {} drops",
            self.columns,
            self.rows,
            self.config.initial_drops
        );
        let result = self.run_frames(display, stop);
        if let Err(err) = &result {
            log::warn!("rain stopped on error: {err}");
        }
        let cleared = display.fill(self.config.palette.background);
        log::debug!("rain stop after {} frames", self.frames);
        result.and(cleared)
    }

    fn run_frames<I: DisplayInterface>(
        &mut self,
        display: &mut Display<I>,
        stop: &AtomicBool,
    ) -> RainResult<I> {
        display.fill(self.config.palette.background)?;
        self.populate();
        while !stop.load(Ordering::Relaxed) {
            self.frame(display)?;
        }
        Ok(())
    }

    /// Live drops
    pub fn pool(&self) -> &DropPool {
        &self.pool
    }

    /// Animation policy
    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    /// Character columns on screen
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Character rows on screen
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Frames advanced so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// New drop at a random column; random length unless `length` is given
fn spawn<R: RngCore>(
    rng: &mut RandomSource<R>,
    config: &RainConfig,
    columns: u16,
    y: i32,
    length: Option<usize>,
) -> RainDrop {
    let x = rng.random_int(0, i32::from(columns) - 1) as u16;
    let speed = rng.random_int(config.speed.0, config.speed.1) as u8;
    let length =
        length.unwrap_or_else(|| rng.random_int(config.length.0, config.length.1) as usize);
    RainDrop::new(x, y, speed, length, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RAMWR;
    use crate::config::Builder;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockInterface<'a> {
        last_command: Option<u8>,
        pixel_transfers: Vec<Vec<u8>>,
        stop_after: Option<(usize, &'a AtomicBool)>,
        data_writes: usize,
    }

    impl DisplayInterface for MockInterface<'_> {
        type Error = core::convert::Infallible;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.last_command = Some(command);
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if self.last_command == Some(RAMWR) {
                self.pixel_transfers.push(data.to_vec());
            }
            self.data_writes += 1;
            if let Some((limit, stop)) = self.stop_after {
                if self.data_writes >= limit {
                    stop.store(true, Ordering::Relaxed);
                }
            }
            Ok(())
        }

        fn reset<D: embedded_hal::delay::DelayNs>(
            &mut self,
            _delay: &mut D,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn dims() -> Dimensions {
        Dimensions::new(240, 240).unwrap()
    }

    fn test_display(interface: MockInterface<'_>) -> Display<MockInterface<'_>> {
        let config = Builder::new().dimensions(dims()).build().unwrap();
        Display::new(interface, config)
    }

    fn quiet_config() -> RainConfig {
        RainBuilder::new().spawn_chance(0.0).build().unwrap()
    }

    #[test]
    fn test_drop_speed_one_advances_every_update() {
        let mut rng = RandomSource::seeded(1);
        let mut drop = RainDrop::new(5, -3, 1, 7, &mut rng);
        for _ in 0..10 {
            assert!(drop.update(&mut rng, 0.3));
        }
        assert_eq!(drop.y(), 7);
        assert_eq!(drop.x(), 5);
        assert_eq!(drop.length(), 7);
    }

    #[test]
    fn test_drop_speed_gates_advance() {
        let mut rng = RandomSource::seeded(2);
        let mut drop = RainDrop::new(0, 0, 3, 5, &mut rng);
        let moved: Vec<bool> = (0..9).map(|_| drop.update(&mut rng, 0.3)).collect();
        assert_eq!(
            moved,
            [false, false, true, false, false, true, false, false, true]
        );
        assert_eq!(drop.y(), 3);
    }

    #[test]
    fn test_drop_length_fixed_and_head_monotonic() {
        let mut rng = RandomSource::seeded(3);
        let mut drop = RainDrop::new(1, -10, 2, 11, &mut rng);
        let mut last_y = drop.y();
        for _ in 0..500 {
            drop.update(&mut rng, 1.0);
            assert_eq!(drop.chars().len(), 11);
            assert!(drop.y() >= last_y);
            last_y = drop.y();
        }
    }

    #[test]
    fn test_drop_mutation_shifts_trail() {
        let mut rng = RandomSource::seeded(4);
        let mut drop = RainDrop::new(0, 0, 1, 6, &mut rng);
        let before: Vec<u8> = drop.chars().to_vec();
        assert!(drop.update(&mut rng, 1.0));
        assert_eq!(&drop.chars()[1..], &before[..5]);
        assert!(CHARSET.contains(&drop.chars()[0]));
    }

    #[test]
    fn test_drop_without_mutation_keeps_trail() {
        let mut rng = RandomSource::seeded(5);
        let mut drop = RainDrop::new(0, 0, 1, 6, &mut rng);
        let before: Vec<u8> = drop.chars().to_vec();
        drop.update(&mut rng, 0.0);
        assert_eq!(drop.chars(), &before[..]);
    }

    #[test]
    fn test_drop_chars_come_from_charset() {
        let mut rng = RandomSource::seeded(6);
        let drop = RainDrop::new(0, 0, 1, 15, &mut rng);
        assert!(drop.chars().iter().all(|ch| CHARSET.contains(ch)));
    }

    #[test]
    fn test_drop_new_clamps_arguments() {
        let mut rng = RandomSource::seeded(7);
        let drop = RainDrop::new(0, 0, 0, 100, &mut rng);
        assert_eq!(drop.speed(), 1);
        assert_eq!(drop.length(), MAX_TRAIL_LENGTH);
    }

    #[test]
    fn test_palette_tiers() {
        let palette = Palette::default();
        assert_eq!(palette.for_index(0), palette.head);
        assert_eq!(palette.for_index(1), palette.near);
        assert_eq!(palette.for_index(2), palette.near);
        assert_eq!(palette.for_index(3), palette.mid);
        assert_eq!(palette.for_index(4), palette.mid);
        assert_eq!(palette.for_index(5), palette.tail);
        assert_eq!(palette.for_index(14), palette.tail);
    }

    #[test]
    fn test_builder_defaults() {
        let config = RainBuilder::new().build().unwrap();
        assert_eq!(config.initial_drops, 30);
        assert_eq!(config.max_drops, 50);
        assert_eq!(config.speed, (1, 3));
        assert_eq!(config.length, (5, 15));
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(matches!(
            RainBuilder::new().max_drops(POOL_CAPACITY + 1).build(),
            Err(BuilderError::InvalidPopulation { .. })
        ));
        assert!(matches!(
            RainBuilder::new().speed(0, 3).build(),
            Err(BuilderError::InvalidRange { name: "speed", .. })
        ));
        assert!(matches!(
            RainBuilder::new().length(10, 5).build(),
            Err(BuilderError::InvalidRange { name: "length", .. })
        ));
        assert!(matches!(
            RainBuilder::new().length(5, MAX_TRAIL_LENGTH as i32 + 1).build(),
            Err(BuilderError::InvalidRange { .. })
        ));
        assert!(matches!(
            RainBuilder::new().spawn_chance(1.5).build(),
            Err(BuilderError::InvalidProbability { name: "spawn_chance" })
        ));
        assert!(matches!(
            RainBuilder::new().mutation_chance(f32::NAN).build(),
            Err(BuilderError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_populate_spawns_initial_drops() {
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(8), &dims());
        rain.populate();
        assert_eq!(rain.pool().len(), 30);
        assert_eq!((rain.columns(), rain.rows()), (30, 30));
        for drop in rain.pool().iter() {
            assert!(drop.x() < 30);
            assert!((-20..=0).contains(&drop.y()));
            assert!((1..=3).contains(&drop.speed()));
            assert!((5..=15).contains(&drop.length()));
        }
    }

    #[test]
    fn test_drop_past_bottom_is_replaced_once() {
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(9), &dims());
        let mut rng = RandomSource::seeded(10);
        // Tail at row 29 now; one more step moves it past the last row
        let leaving = RainDrop::new(4, 29 + 5, 1, 5, &mut rng);
        let staying = RainDrop::new(6, 28 + 5, 1, 5, &mut rng);
        assert!(rain.pool.push(leaving));
        assert!(rain.pool.push(staying));

        rain.advance();

        assert_eq!(rain.pool().len(), 2);
        let drops: Vec<_> = rain.pool().iter().copied().collect();
        assert_eq!(drops[0].y(), -5);
        assert_eq!(drops[0].length(), 5);
        assert!(!drops[0].has_passed(29));
        assert_eq!(drops[1].x(), 6);
        assert_eq!(drops[1].y(), 34);
    }

    #[test]
    fn test_recycle_only_after_advance() {
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(11), &dims());
        let mut rng = RandomSource::seeded(12);
        // Already past the bottom but not due to move this frame
        let slow = RainDrop::new(3, 40, 3, 5, &mut rng);
        assert!(rain.pool.push(slow));
        rain.advance();
        assert_eq!(rain.pool().iter().next().map(RainDrop::y), Some(40));
        rain.advance();
        rain.advance();
        assert_eq!(rain.pool().iter().next().map(RainDrop::y), Some(-5));
    }

    #[test]
    fn test_growth_never_exceeds_cap() {
        let config = RainBuilder::new()
            .initial_drops(30)
            .max_drops(50)
            .spawn_chance(1.0)
            .build()
            .unwrap();
        let mut rain = Rain::new(config, RandomSource::seeded(13), &dims());
        rain.populate();
        for _ in 0..200 {
            rain.advance();
            assert!(rain.pool().len() <= 50);
        }
        assert_eq!(rain.pool().len(), 50);
        assert_eq!(rain.frames(), 200);
    }

    #[test]
    fn test_growth_spawns_above_screen() {
        let config = RainBuilder::new()
            .initial_drops(0)
            .spawn_chance(1.0)
            .mutation_chance(0.0)
            .speed(3, 3)
            .build()
            .unwrap();
        let mut rain = Rain::new(config, RandomSource::seeded(14), &dims());
        rain.advance();
        assert_eq!(rain.pool().len(), 1);
        let drop = rain.pool().iter().next().copied().unwrap();
        assert!((-5..=-1).contains(&drop.y()));
    }

    #[test]
    fn test_pool_push_respects_max() {
        let mut rng = RandomSource::seeded(15);
        let mut pool = DropPool::new(2);
        assert!(pool.push(RainDrop::new(0, 0, 1, 5, &mut rng)));
        assert!(pool.push(RainDrop::new(1, 0, 1, 5, &mut rng)));
        assert!(!pool.push(RainDrop::new(2, 0, 1, 5, &mut rng)));
        assert_eq!(pool.len(), 2);
        assert!(pool.is_full());
        assert_eq!(DropPool::new(1_000).max(), POOL_CAPACITY);
    }

    #[test]
    fn test_draw_only_visible_cells() {
        let mut display = test_display(MockInterface::default());
        let mut rng = RandomSource::seeded(16);
        // Head on row 1: only trail indices 0 and 1 are on screen
        let drop = RainDrop::new(2, 1, 1, 5, &mut rng);
        drop.draw(&mut display, 30, &Palette::default()).unwrap();
        let interface = display.release();
        assert_eq!(interface.pixel_transfers.len(), 2 * 64);
    }

    #[test]
    fn test_draw_uses_head_color_and_background() {
        let mut display = test_display(MockInterface::default());
        let mut rng = RandomSource::seeded(17);
        let palette = Palette::default();
        let drop = RainDrop::new(0, 0, 1, 5, &mut rng);
        drop.draw(&mut display, 30, &palette).unwrap();
        let interface = display.release();
        let head = palette.head.to_be_bytes();
        let background = palette.background.to_be_bytes();
        assert!(
            interface
                .pixel_transfers
                .iter()
                .all(|data| data[..] == head[..] || data[..] == background[..])
        );
        assert!(interface.pixel_transfers.iter().any(|data| data[..] == head[..]));
    }

    #[test]
    fn test_draw_off_screen_drop_writes_nothing() {
        let mut display = test_display(MockInterface::default());
        let mut rng = RandomSource::seeded(18);
        RainDrop::new(0, -1, 1, 5, &mut rng)
            .draw(&mut display, 30, &Palette::default())
            .unwrap();
        RainDrop::new(0, 40, 1, 5, &mut rng)
            .draw(&mut display, 30, &Palette::default())
            .unwrap();
        assert!(display.release().pixel_transfers.is_empty());
    }

    #[test]
    fn test_run_with_stop_set_clears_twice() {
        let stop = AtomicBool::new(true);
        let mut display = test_display(MockInterface::default());
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(19), &dims());
        rain.run(&mut display, &stop).unwrap();
        let interface = display.release();
        let total: usize = interface.pixel_transfers.iter().map(Vec::len).sum();
        assert_eq!(total, 2 * 240 * 240 * 2);
        assert_eq!(rain.frames(), 0);
        assert_eq!(rain.pool().len(), 30);
    }

    #[test]
    fn test_frame_draws_before_advancing() {
        let mut display = test_display(MockInterface::default());
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(21), &dims());
        let mut rng = RandomSource::seeded(22);
        assert!(rain.pool.push(RainDrop::new(3, 0, 1, 5, &mut rng)));

        rain.frame(&mut display).unwrap();

        // Only the head cell on row 0 was visible when drawn
        assert_eq!(display.release().pixel_transfers.len(), 64);
        assert_eq!(rain.pool().iter().next().map(RainDrop::y), Some(1));
    }

    #[test]
    fn test_run_takes_grid_from_display() {
        let stop = AtomicBool::new(true);
        let config = Builder::new()
            .dimensions(Dimensions::new(160, 80).unwrap())
            .build()
            .unwrap();
        let mut display = Display::new(MockInterface::default(), config);
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(23), &dims());
        assert_eq!((rain.columns(), rain.rows()), (30, 30));

        rain.run(&mut display, &stop).unwrap();

        assert_eq!((rain.columns(), rain.rows()), (20, 10));
        assert!(rain.pool().iter().all(|drop| drop.x() < 20));
    }

    #[derive(Debug, PartialEq)]
    struct BusFault;

    /// Fails exactly one data write, then recovers
    #[derive(Debug, Default)]
    struct FlakyInterface {
        last_command: Option<u8>,
        pixel_transfers: Vec<Vec<u8>>,
        data_writes: usize,
        fail_on: usize,
    }

    impl DisplayInterface for FlakyInterface {
        type Error = BusFault;

        fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
            self.last_command = Some(command);
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.data_writes += 1;
            if self.data_writes == self.fail_on {
                return Err(BusFault);
            }
            if self.last_command == Some(RAMWR) {
                self.pixel_transfers.push(data.to_vec());
            }
            Ok(())
        }

        fn reset<D: embedded_hal::delay::DelayNs>(
            &mut self,
            _delay: &mut D,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_run_frame_error_still_clears() {
        let stop = AtomicBool::new(false);
        // The opening clear takes 227 writes; fail inside a later frame
        let interface = FlakyInterface {
            fail_on: 300,
            ..FlakyInterface::default()
        };
        let config = Builder::new().dimensions(dims()).build().unwrap();
        let mut display = Display::new(interface, config);
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(24), &dims());

        let result = rain.run(&mut display, &stop);

        assert!(matches!(result, Err(Error::Interface(BusFault))));
        assert!(!stop.load(Ordering::Relaxed));
        let interface = display.release();
        assert!(interface.data_writes > 300);
        let transfers = &interface.pixel_transfers;
        let tail = &transfers[transfers.len() - 225..];
        assert!(tail.iter().all(|data| data.len() == 512 && data.iter().all(|b| *b == 0)));
    }

    #[test]
    fn test_run_opening_clear_error_still_clears() {
        let stop = AtomicBool::new(false);
        let interface = FlakyInterface {
            fail_on: 5,
            ..FlakyInterface::default()
        };
        let config = Builder::new().dimensions(dims()).build().unwrap();
        let mut display = Display::new(interface, config);
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(25), &dims());

        let result = rain.run(&mut display, &stop);

        assert!(matches!(result, Err(Error::Interface(BusFault))));
        assert_eq!(rain.frames(), 0);
        let interface = display.release();
        let total: usize = interface.pixel_transfers.iter().map(Vec::len).sum();
        // Opening clear broke after two pixel transfers, closing clear is whole
        assert_eq!(total, 2 * 512 + 240 * 240 * 2);
    }

    #[test]
    fn test_run_stops_at_frame_boundary_and_clears() {
        let stop = AtomicBool::new(false);
        let interface = MockInterface {
            stop_after: Some((2_000, &stop)),
            ..MockInterface::default()
        };
        let mut display = test_display(interface);
        let mut rain = Rain::new(quiet_config(), RandomSource::seeded(20), &dims());
        rain.run(&mut display, &stop).unwrap();
        assert!(rain.frames() > 0);

        let interface = display.release();
        let transfers = &interface.pixel_transfers;
        // 240 * 240 black pixels in 225 full 256-pixel transfers
        let tail = &transfers[transfers.len() - 225..];
        assert!(tail.iter().all(|data| data.len() == 512 && data.iter().all(|b| *b == 0)));
    }
}
