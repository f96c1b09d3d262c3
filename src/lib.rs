//! Slime Mold - pheromone-trail foraging on a toroidal grid

pub mod core;
pub mod driver;
pub mod persistence;
pub mod render;
pub mod simulation;
pub mod spatial;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, SlimeError};
pub use driver::{Driver, Frame};
pub use simulation::{GridState, SimulationEngine};
