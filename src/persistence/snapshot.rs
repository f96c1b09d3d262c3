//! Snapshot serialization for the full grid state
//!
//! A snapshot is a versioned JSON document: dimensions first, then the two
//! scalars, then the four layers flattened in row-major order. Occupancy is
//! stored as 0/1 bytes and headings as degrees. Decoding validates everything
//! before building a `GridState`, so a bad blob never yields a partial state.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SlimeError};
use crate::core::types::Heading;
use crate::simulation::state::GridState;
use crate::spatial::grid::Grid;

/// Bumped whenever the layout below changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotBlob {
    format_version: u32,
    rows: usize,
    cols: usize,
    population: u32,
    step_interval_ms: u64,
    occupied: Vec<u8>,
    direction: Vec<Heading>,
    signal: Vec<i32>,
    pheromone: Vec<i32>,
}

pub struct SnapshotCodec;

impl SnapshotCodec {
    pub fn encode(state: &GridState) -> Result<Vec<u8>> {
        let blob = SnapshotBlob {
            format_version: FORMAT_VERSION,
            rows: state.rows(),
            cols: state.cols(),
            population: state.population,
            step_interval_ms: state.step_interval_ms,
            occupied: state.occupied.as_slice().iter().map(|&o| o as u8).collect(),
            direction: state.direction.as_slice().to_vec(),
            signal: state.signal.as_slice().to_vec(),
            pheromone: state.pheromone.as_slice().to_vec(),
        };
        Ok(serde_json::to_vec(&blob)?)
    }

    /// Decode a snapshot taken on a `rows` x `cols` grid
    pub fn decode(bytes: &[u8], rows: usize, cols: usize) -> Result<GridState> {
        let blob: SnapshotBlob = serde_json::from_slice(bytes)
            .map_err(|e| SlimeError::SnapshotFormat(format!("unreadable snapshot: {}", e)))?;

        if blob.format_version != FORMAT_VERSION {
            return Err(SlimeError::SnapshotFormat(format!(
                "unsupported format version {} (expected {})",
                blob.format_version, FORMAT_VERSION
            )));
        }
        if (blob.rows, blob.cols) != (rows, cols) {
            return Err(SlimeError::SnapshotFormat(format!(
                "snapshot grid is {}x{}, engine grid is {}x{}",
                blob.rows, blob.cols, rows, cols
            )));
        }

        let occupied = blob
            .occupied
            .iter()
            .map(|&byte| match byte {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(SlimeError::SnapshotFormat(format!(
                    "occupancy byte {} is not 0 or 1",
                    other
                ))),
            })
            .collect::<Result<Vec<bool>>>()?;
        if let Some(negative) = blob.signal.iter().chain(&blob.pheromone).find(|&&v| v < 0) {
            return Err(SlimeError::SnapshotFormat(format!(
                "negative layer value {}",
                negative
            )));
        }

        Ok(GridState {
            occupied: layer("occupied", rows, cols, occupied)?,
            direction: layer("direction", rows, cols, blob.direction)?,
            signal: layer("signal", rows, cols, blob.signal)?,
            pheromone: layer("pheromone", rows, cols, blob.pheromone)?,
            population: blob.population,
            step_interval_ms: blob.step_interval_ms,
        })
    }

    /// Write to a sibling temp file, then rename it over `path`.
    ///
    /// An existing snapshot at `path` is only replaced once the new one is
    /// fully on disk.
    pub fn save(state: &GridState, path: &Path) -> Result<()> {
        let bytes = Self::encode(state)?;
        let staging = staging_path(path);
        if let Err(e) = fs::write(&staging, bytes) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            SlimeError::from(e)
        })
    }

    pub fn load(path: &Path, rows: usize, cols: usize) -> Result<GridState> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes, rows, cols)
    }
}

/// `<path>.tmp`, in the same directory so the rename stays on one filesystem
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn layer<T: Clone + Default>(name: &str, rows: usize, cols: usize, data: Vec<T>) -> Result<Grid<T>> {
    let len = data.len();
    Grid::from_vec(rows, cols, data).ok_or_else(|| {
        SlimeError::SnapshotFormat(format!(
            "{} layer has {} cells, expected {}",
            name,
            len,
            rows * cols
        ))
    })
}
