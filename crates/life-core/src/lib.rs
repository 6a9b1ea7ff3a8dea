//! Core grid state and generation stepping shared across the Life workspace.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use thiserror::Error;

/// Minimum cell size in display units.
pub const CELL_SIZE_MIN: u32 = 1;
/// Maximum cell size in display units.
pub const CELL_SIZE_MAX: u32 = 20;
/// Slowest allowed simulation rate in generations per second.
pub const TICK_RATE_MIN: f32 = 1.0;
/// Fastest allowed simulation rate in generations per second.
pub const TICK_RATE_MAX: f32 = 60.0;

/// Upper bound on generations a single clock advance may request. Keeps a
/// stalled frame from queueing unbounded catch-up work.
const MAX_PENDING_STEPS: u32 = 240;

const BAND_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Monotonic generation counter, reset when a new seed is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Per-cell color. Only meaningful where the cell is alive; stale elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::opaque(0, 0, 0)
    }
}

impl Rgba {
    /// Construct a fully opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Uniform random opaque color, assigned to cells on birth.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::opaque(rng.random(), rng.random(), rng.random())
    }
}

/// Neighbor lookup behavior at the grid border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Edges wrap: the neighbor of the rightmost column is the leftmost.
    #[default]
    Torus,
    /// Out-of-bounds neighbors are skipped entirely.
    Clamped,
}

/// Static configuration for a Life world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeConfig {
    /// Grid width in cells. Clamped to at least 1.
    pub grid_width: usize,
    /// Grid height in cells. Clamped to at least 1.
    pub grid_height: usize,
    /// Display size of one cell, bounded to `[CELL_SIZE_MIN, CELL_SIZE_MAX]`.
    pub cell_size: u32,
    /// Simulation rate in generations per second.
    pub ticks_per_second: f32,
    /// Number of row bands the step sweep is partitioned into.
    pub worker_count: usize,
    /// Border behavior for neighbor counting.
    pub topology: Topology,
    /// Probability that a cell starts alive under the random pattern.
    pub random_fill_density: f64,
    /// Optional RNG seed for reproducible runs (birth colors included).
    pub rng_seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_width: 128,
            grid_height: 72,
            cell_size: 2,
            ticks_per_second: 5.0,
            worker_count: 8,
            topology: Topology::Torus,
            random_fill_density: 0.2,
            rng_seed: None,
        }
    }
}

/// Errors raised when mutating world state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// A pattern source handed back a grid of the wrong dimensions.
    #[error("seed '{name}' is {actual_width}x{actual_height} but the grid expects {expected_width}x{expected_height}")]
    SeedDimensionMismatch {
        name: String,
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

/// An initial population produced by a pattern source, sized exactly to the
/// grid it will be applied to.
#[derive(Debug, Clone)]
pub struct Seed {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    colors: Vec<Rgba>,
    name: String,
}

impl Seed {
    /// All-dead seed of the given dimensions (each clamped to at least 1).
    #[must_use]
    pub fn blank(width: usize, height: usize, name: impl Into<String>) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![false; width * height],
            colors: vec![Rgba::default(); width * height],
            name: name.into(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark a cell alive, wrapping coordinates toroidally so patterns larger
    /// than the grid still land somewhere sensible.
    pub fn stamp(&mut self, x: i64, y: i64, color: Rgba) {
        let x = x.rem_euclid(self.width as i64) as usize;
        let y = y.rem_euclid(self.height as i64) as usize;
        let idx = y * self.width + x;
        self.cells[idx] = true;
        self.colors[idx] = color;
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|alive| **alive).count()
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }
}

/// Dense double-buffered cell grid.
///
/// `cells` and `colors` describe the current generation; `scratch` is the
/// write target for the next one and is never exposed to readers. All three
/// buffers always hold exactly `width * height` entries.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    colors: Vec<Rgba>,
    scratch: Vec<bool>,
}

impl Grid {
    /// All-dead grid. Dimensions are clamped to at least 1x1, never rejected.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![false; width * height],
            colors: vec![Rgba::default(); width * height],
            scratch: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Current-generation alive flags, row major.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Per-cell colors, row major. Stale where the cell is dead.
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> Rgba {
        if x < self.width && y < self.height {
            self.colors[y * self.width + x]
        } else {
            Rgba::default()
        }
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|alive| **alive).count()
    }

    /// Replace the live population from a seed of matching dimensions.
    fn install(&mut self, seed: Seed) {
        debug_assert_eq!(seed.width, self.width);
        debug_assert_eq!(seed.height, self.height);
        self.cells = seed.cells;
        self.colors = seed.colors;
        self.scratch.fill(false);
    }

    /// Reallocate all three buffers at the new dimensions, preserving the
    /// overlapping top-left region of `cells` and `colors`. Cells outside the
    /// overlap are lost, not wrapped. Requested sizes clamp to at least 1.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        let new_width = new_width.max(1);
        let new_height = new_height.max(1);
        if new_width == self.width && new_height == self.height {
            return;
        }

        let mut cells = vec![false; new_width * new_height];
        let mut colors = vec![Rgba::default(); new_width * new_height];
        let copy_w = self.width.min(new_width);
        let copy_h = self.height.min(new_height);
        for y in 0..copy_h {
            let src = y * self.width;
            let dst = y * new_width;
            cells[dst..dst + copy_w].copy_from_slice(&self.cells[src..src + copy_w]);
            colors[dst..dst + copy_w].copy_from_slice(&self.colors[src..src + copy_w]);
        }

        self.cells = cells;
        self.colors = colors;
        self.scratch = vec![false; new_width * new_height];
        self.width = new_width;
        self.height = new_height;
    }

    /// Compute the next generation into `scratch` across disjoint row bands,
    /// then publish it by swapping buffer identities.
    ///
    /// Each band reads only the immutable pre-step `cells` snapshot and
    /// writes only its own rows of `scratch` and `colors`, so no locking is
    /// needed and results are independent of worker scheduling. `step_seed`
    /// derives the per-band birth-color RNG streams.
    pub fn step(&mut self, topology: Topology, worker_count: usize, step_seed: u64) {
        let width = self.width;
        let height = self.height;
        let workers = worker_count.clamp(1, height);
        let rows_per_band = height / workers;

        let mut bands: Vec<(usize, &mut [bool], &mut [Rgba])> = Vec::with_capacity(workers);
        let mut scratch_rest: &mut [bool] = &mut self.scratch;
        let mut colors_rest: &mut [Rgba] = &mut self.colors;
        let mut row = 0;
        for band in 0..workers {
            // The last band absorbs the remainder rows.
            let rows = if band + 1 == workers {
                height - row
            } else {
                rows_per_band
            };
            let (scratch_band, next_scratch) = scratch_rest.split_at_mut(rows * width);
            let (color_band, next_colors) = colors_rest.split_at_mut(rows * width);
            scratch_rest = next_scratch;
            colors_rest = next_colors;
            bands.push((row, scratch_band, color_band));
            row += rows;
        }

        let cells = &self.cells;
        bands
            .into_par_iter()
            .for_each(|(start_row, scratch_band, color_band)| {
                let band_seed = step_seed ^ (start_row as u64).wrapping_mul(BAND_SEED_MIX);
                let mut rng = SmallRng::seed_from_u64(band_seed);
                let rows = scratch_band.chunks_mut(width).zip(color_band.chunks_mut(width));
                for (dy, (scratch_row, color_row)) in rows.enumerate() {
                    let y = start_row + dy;
                    for x in 0..width {
                        let neighbors = count_alive_neighbors(cells, width, height, x, y, topology);
                        let alive = cells[y * width + x];
                        let next = matches!((alive, neighbors), (true, 2 | 3) | (false, 3));
                        if next && !alive {
                            color_row[x] = Rgba::random(&mut rng);
                        }
                        scratch_row[x] = next;
                    }
                }
            });

        mem::swap(&mut self.cells, &mut self.scratch);
    }
}

fn count_alive_neighbors(
    cells: &[bool],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    topology: Topology,
) -> u8 {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = match topology {
                Topology::Torus => (
                    (x as i64 + dx).rem_euclid(width as i64) as usize,
                    (y as i64 + dy).rem_euclid(height as i64) as usize,
                ),
                Topology::Clamped => {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    (nx as usize, ny as usize)
                }
            };
            if cells[ny * width + nx] {
                count += 1;
            }
        }
    }
    count
}

/// Fixed-rate accumulator decoupling simulation speed from frame rate.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    ticks_per_second: f32,
    accumulator: f32,
}

impl SimulationClock {
    #[must_use]
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.clamp(TICK_RATE_MIN, TICK_RATE_MAX),
            accumulator: 0.0,
        }
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Seconds between generations; the reciprocal of the tick rate.
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.ticks_per_second
    }

    /// Returns the clamped rate actually applied.
    pub fn set_ticks_per_second(&mut self, rate: f32) -> f32 {
        self.ticks_per_second = rate.clamp(TICK_RATE_MIN, TICK_RATE_MAX);
        self.ticks_per_second
    }

    pub fn adjust_ticks_per_second(&mut self, delta: f32) -> f32 {
        self.set_ticks_per_second(self.ticks_per_second + delta)
    }

    /// Add elapsed wall-clock time and return how many whole generations are
    /// due. May return zero, one, or many; the accumulator is capped at
    /// `MAX_PENDING_STEPS` intervals.
    pub fn advance(&mut self, delta_seconds: f32) -> u32 {
        if delta_seconds <= 0.0 {
            return 0;
        }
        let interval = self.tick_interval();
        self.accumulator += delta_seconds;
        let cap = interval * MAX_PENDING_STEPS as f32;
        if self.accumulator > cap {
            self.accumulator = cap;
        }
        let steps = (self.accumulator / interval).floor() as u32;
        self.accumulator -= steps as f32 * interval;
        steps
    }

    /// Drop any accumulated time, e.g. after a pause or pattern switch.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Owning simulation state: grid, clock, generation counter, and the knobs
/// mutated by input handling. All mutation goes through explicit methods.
pub struct LifeWorld {
    config: LifeConfig,
    grid: Grid,
    clock: SimulationClock,
    generation: Generation,
    pattern_name: String,
    world_seed: u64,
}

impl LifeWorld {
    #[must_use]
    pub fn new(config: LifeConfig) -> Self {
        let world_seed = config.rng_seed.unwrap_or_else(|| rand::rng().random());
        let grid = Grid::new(config.grid_width, config.grid_height);
        let clock = SimulationClock::new(config.ticks_per_second);
        let mut config = config;
        config.grid_width = grid.width();
        config.grid_height = grid.height();
        config.cell_size = config.cell_size.clamp(CELL_SIZE_MIN, CELL_SIZE_MAX);
        config.ticks_per_second = clock.ticks_per_second();
        Self {
            config,
            grid,
            clock,
            generation: Generation::default(),
            pattern_name: String::new(),
            world_seed,
        }
    }

    pub fn config(&self) -> &LifeConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pattern_name(&self) -> &str {
        &self.pattern_name
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn cell_size(&self) -> u32 {
        self.config.cell_size
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.clock.ticks_per_second()
    }

    /// Seed used for reproducible runs; randomized when the config omits one.
    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    /// Advance exactly one generation.
    pub fn step(&mut self) {
        let step_seed = self
            .world_seed
            .wrapping_add(self.generation.0.wrapping_mul(BAND_SEED_MIX));
        self.grid
            .step(self.config.topology, self.config.worker_count, step_seed);
        self.generation.0 += 1;
    }

    /// Feed elapsed wall-clock time to the clock and run however many
    /// generations fall due. Returns the number of generations run.
    pub fn advance(&mut self, delta_seconds: f32) -> u32 {
        let steps = self.clock.advance(delta_seconds);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Resize the grid, preserving the overlapping top-left region. Safe to
    /// call between steps only; dimensions clamp to at least 1.
    pub fn resize(&mut self, new_width: usize, new_height: usize) {
        self.grid.resize(new_width, new_height);
        self.config.grid_width = self.grid.width();
        self.config.grid_height = self.grid.height();
    }

    /// Replace the population from a pattern seed and reset the generation
    /// counter. A seed of the wrong dimensions is rejected and the previous
    /// state is left untouched.
    pub fn apply_seed(&mut self, seed: Seed) -> Result<(), WorldError> {
        if seed.width() != self.grid.width() || seed.height() != self.grid.height() {
            return Err(WorldError::SeedDimensionMismatch {
                name: seed.name().to_owned(),
                expected_width: self.grid.width(),
                expected_height: self.grid.height(),
                actual_width: seed.width(),
                actual_height: seed.height(),
            });
        }
        self.pattern_name = seed.name().to_owned();
        self.grid.install(seed);
        self.generation = Generation::default();
        self.clock.reset();
        Ok(())
    }

    /// Returns the clamped size actually applied.
    pub fn set_cell_size(&mut self, size: u32) -> u32 {
        self.config.cell_size = size.clamp(CELL_SIZE_MIN, CELL_SIZE_MAX);
        self.config.cell_size
    }

    pub fn adjust_cell_size(&mut self, delta: i32) -> u32 {
        let current = self.config.cell_size as i64;
        let requested = (current + delta as i64).clamp(0, u32::MAX as i64) as u32;
        self.set_cell_size(requested.max(CELL_SIZE_MIN))
    }

    pub fn set_ticks_per_second(&mut self, rate: f32) -> f32 {
        let applied = self.clock.set_ticks_per_second(rate);
        self.config.ticks_per_second = applied;
        applied
    }

    pub fn adjust_ticks_per_second(&mut self, delta: f32) -> f32 {
        let applied = self.clock.adjust_ticks_per_second(delta);
        self.config.ticks_per_second = applied;
        applied
    }
}
