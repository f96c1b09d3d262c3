pub mod grid;

pub use grid::{wrap, Grid};
