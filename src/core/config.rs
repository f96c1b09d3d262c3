//! Simulation configuration
//!
//! Scalar parameters the driver reads (population, step cadence) together with the
//! bounds they are validated against. Loadable from TOML; every field has a default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SlimeError};
use crate::core::types::CELL_COUNT;

/// Inclusive bounds applied to the scalar parameters at the call boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub population_min: u32,
    pub population_max: u32,
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            population_min: 1,
            population_max: 50,
            interval_min_ms: 50,
            interval_max_ms: 1000,
        }
    }
}

impl ParameterBounds {
    pub fn check_population(&self, population: u32) -> Result<()> {
        SlimeError::check_range(
            "population",
            population as u64,
            self.population_min as u64,
            (self.population_max as u64).min(CELL_COUNT as u64),
        )
    }

    pub fn check_interval(&self, step_interval_ms: u64) -> Result<()> {
        SlimeError::check_range(
            "step interval",
            step_interval_ms,
            self.interval_min_ms,
            self.interval_max_ms,
        )
    }
}

/// Configuration for a simulation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Agents placed by `initialize`
    pub population: u32,

    /// Milliseconds between driver ticks
    ///
    /// Only the driver reads this. The engine carries it so snapshots keep it.
    pub step_interval_ms: u64,

    /// RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,

    pub bounds: ParameterBounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population: 10,
            step_interval_ms: 500,
            seed: None,
            bounds: ParameterBounds::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let b = &self.bounds;
        if b.population_min == 0 || b.population_min > b.population_max {
            return Err(SlimeError::Config(format!(
                "population bounds {}..={} are empty or include zero",
                b.population_min, b.population_max
            )));
        }
        if b.population_max as usize > CELL_COUNT {
            return Err(SlimeError::Config(format!(
                "population_max ({}) exceeds grid capacity ({})",
                b.population_max, CELL_COUNT
            )));
        }
        if b.interval_min_ms == 0 || b.interval_min_ms > b.interval_max_ms {
            return Err(SlimeError::Config(format!(
                "step interval bounds {}..={} are empty or include zero",
                b.interval_min_ms, b.interval_max_ms
            )));
        }

        b.check_population(self.population)?;
        b.check_interval(self.step_interval_ms)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| SlimeError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SlimeError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}
