//! Grid state - the four per-cell layers plus the scalar parameters
//!
//! Layers are stored densely even where they are only meaningful for occupied
//! cells (direction). Rules in `simulation::rules` are the only writers.

use crate::core::types::{Cell, Heading, COLS, ROWS};
use crate::spatial::grid::Grid;

/// Full simulation state as published to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    /// True where an agent resides (at most one per cell)
    pub occupied: Grid<bool>,
    /// Agent heading; only read where `occupied` is true
    pub direction: Grid<Heading>,
    /// Decaying trail marker, independent of occupancy
    pub signal: Grid<i32>,
    /// Chemical concentration agents steer by
    pub pheromone: Grid<i32>,
    pub population: u32,
    pub step_interval_ms: u64,
}

impl GridState {
    /// Empty grid with the standard dimensions
    pub fn new(population: u32, step_interval_ms: u64) -> Self {
        Self::with_dimensions(ROWS, COLS, population, step_interval_ms)
    }

    pub fn with_dimensions(rows: usize, cols: usize, population: u32, step_interval_ms: u64) -> Self {
        Self {
            occupied: Grid::new(rows, cols),
            direction: Grid::new(rows, cols),
            signal: Grid::new(rows, cols),
            pheromone: Grid::new(rows, cols),
            population,
            step_interval_ms,
        }
    }

    pub fn rows(&self) -> usize {
        self.occupied.rows
    }

    pub fn cols(&self) -> usize {
        self.occupied.cols
    }

    /// Reset all four layers, keeping dimensions and scalars
    pub fn clear(&mut self) {
        self.occupied.fill(false);
        self.direction.fill(Heading::default());
        self.signal.fill(0);
        self.pheromone.fill(0);
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        *self.occupied.get(cell)
    }

    /// Heading of the agent at `cell`, if any
    pub fn agent_heading(&self, cell: Cell) -> Option<Heading> {
        self.is_occupied(cell).then(|| *self.direction.get(cell))
    }

    /// Place an agent, overwriting whatever heading was stored there
    pub fn place_agent(&mut self, cell: Cell, heading: Heading) {
        self.occupied.set(cell, true);
        self.direction.set(cell, heading);
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.count(|&o| o)
    }

    /// Occupied cells in row-major order
    pub fn agents(&self) -> impl Iterator<Item = Cell> + '_ {
        self.occupied.cells().filter(move |&cell| self.is_occupied(cell))
    }

    pub fn pheromone_total(&self) -> i64 {
        self.pheromone.as_slice().iter().map(|&p| p as i64).sum()
    }
}
