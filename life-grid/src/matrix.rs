use crate::cell::{Cell, next_alive};
use crate::render::CellView;
use crate::{GridSize, Loc, Random};
use arrayvec::ArrayVec;
use log::{debug, warn};
use rayon::prelude::*;
use std::ops::Index;

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

type Neighbors = ArrayVec<usize, 8>;

/// All the cells of a bounded grid, stored row-major.
///
/// Every cell always carries both its committed state and the pending state
/// the next [`tick`](Self::tick) will commit, so a renderer can interpolate
/// between the two at any moment.
#[derive(Clone, Debug)]
pub struct CellMatrix {
    size: GridSize,
    cells: Vec<Cell>,
    neighbors: Vec<Neighbors>,
    next_alive: Vec<bool>,
    alive_count: usize,
    total_age: usize,
    generation: u64,
}

impl CellMatrix {
    /// An all-dead grid.
    pub fn new(size: GridSize) -> Self {
        assert!(
            size.width > 0 && size.height > 0,
            "Grid size must be positive, got {}x{}",
            size.width,
            size.height
        );
        Self {
            size,
            cells: vec![Cell::default(); size.num_cells()],
            neighbors: Self::build_neighbors(size),
            next_alive: Vec::with_capacity(size.num_cells()),
            alive_count: 0,
            total_age: 0,
            generation: 0,
        }
    }

    pub fn with_seed(size: GridSize, rand: &mut Random) -> Self {
        let mut result = Self::new(size);
        result.add_seed(rand);
        result
    }

    fn build_neighbors(size: GridSize) -> Vec<Neighbors> {
        (0..size.num_cells())
            .map(|index| {
                let loc = Loc::from_grid_index(index, size);
                NEIGHBOR_OFFSETS
                    .iter()
                    .filter_map(|&(d_row, d_col)| loc.offset(d_row, d_col, size))
                    .filter_map(|neighbor| neighbor.grid_index(size))
                    .collect()
            })
            .collect()
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn cells_iter(&self) -> impl DoubleEndedIterator<Item = &Cell> + Clone {
        self.cells.iter()
    }

    pub fn cell(&self, loc: Loc) -> Option<&Cell> {
        loc.grid_index(self.size).map(|index| &self.cells[index])
    }

    pub fn neighbor_locs(&self, loc: Loc) -> impl Iterator<Item = Loc> + '_ {
        let size = self.size;
        loc.grid_index(size)
            .into_iter()
            .flat_map(move |index| self.neighbors[index].iter())
            .map(move |&neighbor| Loc::from_grid_index(neighbor, size))
    }

    /// Committed and pending state of every cell, in row-major order.
    pub fn views(&self) -> impl Iterator<Item = (Loc, CellView)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Loc::from_grid_index(index, size), cell.view()))
    }

    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Sum of the ages of all cells.
    pub fn total_age(&self) -> usize {
        self.total_age
    }

    /// Mean age of the live cells, or `None` if nothing is alive.
    pub fn average_age(&self) -> Option<f64> {
        if self.alive_count == 0 {
            None
        } else {
            Some(self.total_age as f64 / self.alive_count as f64)
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Commits every cell's pending state, then works out the states the
    /// following tick will commit.
    pub fn tick(&mut self) {
        self.commit();
        self.plan_next();
        debug!(
            "Generation {}: {} alive, average age {:?}",
            self.generation,
            self.alive_count,
            self.average_age()
        );
    }

    fn commit(&mut self) {
        let mut alive_count = 0;
        let mut total_age = 0;
        for cell in self.cells.iter_mut() {
            cell.commit();
            if cell.is_alive() {
                alive_count += 1;
            }
            total_age += cell.alive_frames() as usize;
        }
        self.alive_count = alive_count;
        self.total_age = total_age;
        self.generation += 1;
    }

    // Every pending value is computed from committed state before any cell
    // is written, so the result does not depend on visiting order.
    fn plan_next(&mut self) {
        let cells = &self.cells;
        let neighbors = &self.neighbors;
        (0..cells.len())
            .into_par_iter()
            .map(|index| Self::next_alive_at(cells, neighbors, index))
            .collect_into_vec(&mut self.next_alive);

        for (cell, &alive) in self.cells.iter_mut().zip(&self.next_alive) {
            cell.set_pending(alive);
        }
    }

    fn next_alive_at(cells: &[Cell], neighbors: &[Neighbors], index: usize) -> bool {
        let live_neighbors = neighbors[index]
            .iter()
            .filter(|&&neighbor| cells[neighbor].is_alive())
            .count();
        next_alive(cells[index].is_alive(), live_neighbors)
    }

    /// Schedules a fresh 50/50 random population for the next tick.
    pub fn add_seed(&mut self, rand: &mut Random) {
        for cell in self.cells.iter_mut() {
            cell.reseed(rand.next_fraction() > 0.5);
        }
    }

    /// Schedules exactly `live` to be alive at the next tick and everything
    /// else dead. Locations off the grid are skipped.
    pub fn seed_pattern(&mut self, live: &[Loc]) {
        for cell in self.cells.iter_mut() {
            cell.reseed(false);
        }
        for &loc in live {
            match loc.grid_index(self.size) {
                Some(index) => self.cells[index].reseed(true),
                None => warn!(
                    "Pattern cell {}, {} is outside the {}x{} grid",
                    loc.row, loc.col, self.size.width, self.size.height
                ),
            }
        }
    }
}

impl Index<Loc> for CellMatrix {
    type Output = Cell;

    fn index(&self, loc: Loc) -> &Self::Output {
        self.cell(loc)
            .unwrap_or_else(|| panic!("Index indices {}, {} out of bounds", loc.row, loc.col))
    }
}
