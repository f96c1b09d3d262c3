pub mod engine;
pub mod random;
pub mod rules;
pub mod state;

pub use engine::{SimulationEngine, StepReport};
pub use random::{RandomSource, SeededRandom};
pub use state::GridState;
