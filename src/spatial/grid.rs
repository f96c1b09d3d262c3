//! Toroidal 2D grid for per-cell simulation data

use crate::core::types::Cell;

/// Normalize a coordinate into `[0, extent)` with a single correction.
///
/// Callers never drift more than one extent outside the grid (moves are one cell
/// per step), so one add or subtract is enough.
#[inline]
pub fn wrap(coordinate: isize, extent: usize) -> usize {
    let extent = extent as isize;
    let wrapped = if coordinate >= extent {
        coordinate - extent
    } else if coordinate < 0 {
        coordinate + extent
    } else {
        coordinate
    };
    debug_assert!((0..extent).contains(&wrapped), "coordinate drifted more than one extent");
    wrapped as usize
}

/// Offsets of the 8 cells surrounding a cell
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Dense row-major grid whose edges wrap around
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T: Clone + Default> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    /// Build from row-major data; `None` if the length does not match
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        debug_assert!(cell.row < self.rows && cell.col < self.cols);
        cell.row * self.cols + cell.col
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> &T {
        &self.data[self.index(cell)]
    }

    #[inline]
    pub fn get_mut(&mut self, cell: Cell) -> &mut T {
        let index = self.index(cell);
        &mut self.data[index]
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, value: T) {
        let index = self.index(cell);
        self.data[index] = value;
    }

    /// Cell reached by moving `(dr, dc)` from `cell`, wrapping at the edges
    #[inline]
    pub fn offset(&self, cell: Cell, (dr, dc): (isize, isize)) -> Cell {
        Cell::new(
            wrap(cell.row as isize + dr, self.rows),
            wrap(cell.col as isize + dc, self.cols),
        )
    }

    /// The 8 toroidal neighbors of `cell`
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        NEIGHBOR_OFFSETS.iter().map(move |&delta| self.offset(cell, delta))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Cell::new(i / cols, i % cols))
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Number of cells matching a predicate
    pub fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.data.iter().filter(|v| predicate(*v)).count()
    }
}
