#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! Game of Life engine with age tracking and frame-interpolated rendering.
//!
//! The automaton advances in discrete ticks, while the [`Scheduler`] is
//! driven once per displayed frame and hands every [`Renderer`] the fraction
//! of the way to the next tick.

mod cell;
mod matrix;
mod render;
mod scheduler;
mod simulation;

pub use cell::{Cell, MAX_ALIVE_FRAMES, next_alive};
pub use matrix::CellMatrix;
pub use render::{CellView, Frame, Phase, Renderer, alpha_blend_with_background};
pub use scheduler::{FrameOutcome, Scheduler, Speed, SpeedBounds};
pub use simulation::Simulation;

use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "Grid size must be positive, got {width}x{height}"
        );
        Self { width, height }
    }

    pub fn num_cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, loc: Loc) -> bool {
        loc.row < self.height && loc.col < self.width
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Loc {
    pub row: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    pub fn grid_index(&self, size: GridSize) -> Option<usize> {
        if size.contains(*self) {
            Some(self.row as usize * size.width as usize + self.col as usize)
        } else {
            None
        }
    }

    pub fn from_grid_index(index: usize, size: GridSize) -> Self {
        let width = size.width as usize;
        Self::new((index / width) as u32, (index % width) as u32)
    }

    /// The location `(d_row, d_col)` away, or `None` if that falls off the
    /// grid. Edges are hard: nothing wraps around.
    pub fn offset(&self, d_row: i32, d_col: i32, size: GridSize) -> Option<Loc> {
        let row = self.row as i64 + d_row as i64;
        let col = self.col as i64 + d_col as i64;
        if row < 0 || col < 0 || row >= size.height as i64 || col >= size.width as i64 {
            None
        } else {
            Some(Loc::new(row as u32, col as u32))
        }
    }
}

#[derive(Debug)]
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform in `[0, 1)`.
    pub fn next_fraction(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_index_round_trips_through_loc() {
        let size = GridSize::new(7, 3);
        let loc = Loc::new(2, 5);
        let index = loc.grid_index(size).unwrap();
        assert_eq!(index, 19);
        assert_eq!(Loc::from_grid_index(index, size), loc);
    }

    #[test]
    fn grid_index_rejects_out_of_bounds() {
        let size = GridSize::new(4, 4);
        assert_eq!(Loc::new(4, 0).grid_index(size), None);
        assert_eq!(Loc::new(0, 4).grid_index(size), None);
    }

    #[test]
    fn offset_does_not_wrap() {
        let size = GridSize::new(3, 3);
        assert_eq!(Loc::new(0, 0).offset(-1, 0, size), None);
        assert_eq!(Loc::new(2, 2).offset(0, 1, size), None);
        assert_eq!(Loc::new(1, 1).offset(1, -1, size), Some(Loc::new(2, 0)));
    }

    #[test]
    #[should_panic(expected = "Grid size must be positive")]
    fn zero_width_is_fatal() {
        GridSize::new(0, 10);
    }

    #[test]
    fn seeded_random_is_repeatable() {
        let mut a = Random::from_seed(7);
        let mut b = Random::from_seed(7);
        for _ in 0..10 {
            let fraction = a.next_fraction();
            assert!((0.0..1.0).contains(&fraction));
            assert_eq!(fraction, b.next_fraction());
        }
    }
}
