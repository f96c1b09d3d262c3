//! Simulation engine - owns the grid state and sequences the update rules
//!
//! One step is, in order:
//! directions -> pheromones -> positions -> signals
//!
//! Directions read the previous step's pheromone field before it is refreshed,
//! positions use the headings just chosen, and signals are refreshed last so a
//! newly arrived agent feeds pheromone on the next step. Reordering changes the
//! emergent behavior.

use std::path::Path;

use serde::Serialize;

use crate::core::config::{ParameterBounds, SimulationConfig};
use crate::core::error::Result;
use crate::core::types::Step;
use crate::persistence::snapshot::SnapshotCodec;
use crate::simulation::random::{RandomSource, SeededRandom};
use crate::simulation::rules;
use crate::simulation::state::GridState;

/// Summary of the grid after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub occupied: usize,
    pub signal_cells: usize,
    pub pheromone_total: i64,
    pub pheromone_peak: i32,
}

impl StepReport {
    pub fn from_state(step: Step, state: &GridState) -> Self {
        Self {
            step,
            occupied: state.occupied_count(),
            signal_cells: state.signal.count(|&s| s > 0),
            pheromone_total: state.pheromone_total(),
            pheromone_peak: state.pheromone.as_slice().iter().copied().max().unwrap_or(0),
        }
    }
}

pub struct SimulationEngine<R: RandomSource = SeededRandom> {
    state: GridState,
    rng: R,
    bounds: ParameterBounds,
    step: Step,
}

impl SimulationEngine<SeededRandom> {
    /// Engine seeded from `config.seed`, or from entropy when absent
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => SeededRandom::from_seed(seed),
            None => SeededRandom::from_entropy(),
        };
        tracing::info!("Engine seeded with {}", rng.seed());
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    /// Empty engine using an explicit random source
    pub fn with_rng(config: &SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: GridState::new(config.population, config.step_interval_ms),
            rng,
            bounds: config.bounds.clone(),
            step: 0,
        })
    }

    /// Place `population` agents on a cleared grid.
    ///
    /// Rejected without touching state if the population is outside the
    /// configured bounds or larger than the grid.
    pub fn initialize(&mut self, population: u32) -> Result<()> {
        self.bounds.check_population(population)?;

        self.state.population = population;
        rules::populate(&mut self.state, population as usize, &mut self.rng);
        self.step = 0;

        tracing::info!("Initialized {} agents", population);
        Ok(())
    }

    /// Re-run `initialize` with the current population parameter
    pub fn reset(&mut self) -> Result<()> {
        self.initialize(self.state.population)
    }

    /// Apply the four rules once and return the completed state
    pub fn step(&mut self) -> &GridState {
        rules::update_directions(&mut self.state, &mut self.rng);
        rules::update_pheromones(&mut self.state);
        rules::update_positions(&mut self.state);
        rules::update_signals(&mut self.state);
        self.step += 1;

        tracing::debug!(
            step = self.step,
            occupied = self.state.occupied_count(),
            pheromone = self.state.pheromone_total(),
            "step complete"
        );
        &self.state
    }

    /// Run `steps` steps
    pub fn run(&mut self, steps: u64) -> StepReport {
        for _ in 0..steps {
            self.step();
        }
        self.report()
    }

    pub fn report(&self) -> StepReport {
        StepReport::from_state(self.step, &self.state)
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Owned copy for handing to another thread
    pub fn snapshot(&self) -> GridState {
        self.state.clone()
    }

    pub fn step_count(&self) -> Step {
        self.step
    }

    pub fn bounds(&self) -> &ParameterBounds {
        &self.bounds
    }

    /// Takes effect on the next `initialize`/`reset`
    pub fn set_population(&mut self, population: u32) -> Result<()> {
        self.bounds.check_population(population)?;
        self.state.population = population;
        Ok(())
    }

    /// Takes effect on the driver's next tick
    pub fn set_step_interval(&mut self, step_interval_ms: u64) -> Result<()> {
        self.bounds.check_interval(step_interval_ms)?;
        self.state.step_interval_ms = step_interval_ms;
        Ok(())
    }

    pub fn save_snapshot(&self) -> Result<Vec<u8>> {
        SnapshotCodec::encode(&self.state)
    }

    /// Replace the live state with a decoded snapshot; unchanged on error
    pub fn load_snapshot(&mut self, bytes: &[u8]) -> Result<()> {
        let state = SnapshotCodec::decode(bytes, self.state.rows(), self.state.cols())?;
        self.replace_state(state)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        SnapshotCodec::save(&self.state, path)?;
        tracing::info!("Saved snapshot to {}", path.display());
        Ok(())
    }

    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        let state = SnapshotCodec::load(path, self.state.rows(), self.state.cols())?;
        self.replace_state(state)?;
        tracing::info!("Loaded snapshot from {}", path.display());
        Ok(())
    }

    /// Scalars from a snapshot go through the same bounds as the setters
    fn replace_state(&mut self, state: GridState) -> Result<()> {
        self.bounds.check_population(state.population)?;
        self.bounds.check_interval(state.step_interval_ms)?;
        self.state = state;
        self.step = 0;
        Ok(())
    }
}
