//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Grid height in cells
pub const ROWS: usize = 50;
/// Grid width in cells
pub const COLS: usize = 50;
/// Number of cells on the grid (upper bound for population)
pub const CELL_COUNT: usize = ROWS * COLS;

/// Ceiling for pheromone after each decay pass
pub const PHEROMONE_MAX: i32 = 4;
/// Amount a fading signal adds to each of its 8 neighbors
pub const PHEROMONE_STEP: i32 = 3;
/// Signal placed under each agent at initialization
pub const SEED_SIGNAL: i32 = 3;
/// Signal placed under each agent after it moves
pub const FRESH_SIGNAL: i32 = 2;
/// Signal level that diffuses pheromone into the neighborhood
pub const FADING_SIGNAL: i32 = 1;

/// Simulation step counter
pub type Step = u64;

/// Grid coordinate (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One of the eight compass headings an agent can face.
///
/// Stored as degrees (0, 45, ..., 315). 0° points along +column, 90° along +row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Heading(u16);

impl Heading {
    pub const STEP_DEGREES: u16 = 45;

    /// All eight headings in ascending degree order
    pub const ALL: [Heading; 8] = [
        Heading(0),
        Heading(45),
        Heading(90),
        Heading(135),
        Heading(180),
        Heading(225),
        Heading(270),
        Heading(315),
    ];

    /// Build a heading from degrees; `None` unless it is a multiple of 45 in `[0, 360)`
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        if degrees < 360 && degrees % Self::STEP_DEGREES == 0 {
            Some(Self(degrees))
        } else {
            None
        }
    }

    /// Heading for compass index 0..8
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 8]
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    pub fn index(self) -> usize {
        (self.0 / Self::STEP_DEGREES) as usize
    }

    /// Rotate by a turn, wrapping 315+45 to 0 and 0-45 to 315
    pub fn turn(self, turn: Turn) -> Self {
        let index = self.index() as i32 + turn.offset_steps();
        Self::from_index(index.rem_euclid(8) as usize)
    }

    /// (row, column) delta of a one-cell move along this heading
    pub fn offset(self) -> (isize, isize) {
        match self.0 {
            0 => (0, 1),
            45 => (1, 1),
            90 => (1, 0),
            135 => (1, -1),
            180 => (0, -1),
            225 => (-1, -1),
            270 => (-1, 0),
            _ => (-1, 1),
        }
    }
}

impl TryFrom<u16> for Heading {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees).ok_or_else(|| format!("{} is not a compass heading", degrees))
    }
}

impl From<Heading> for u16 {
    fn from(heading: Heading) -> u16 {
        heading.0
    }
}

impl std::fmt::Display for Heading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Turn chosen by an agent each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Left,
    Straight,
    Right,
}

impl Turn {
    /// Indexed in the order the forward cells are sensed: left, straight, right
    pub const ALL: [Turn; 3] = [Turn::Left, Turn::Straight, Turn::Right];

    /// Number of 45° steps this turn applies
    pub fn offset_steps(self) -> i32 {
        match self {
            Turn::Left => -1,
            Turn::Straight => 0,
            Turn::Right => 1,
        }
    }

    pub fn offset_degrees(self) -> i32 {
        self.offset_steps() * Heading::STEP_DEGREES as i32
    }
}
