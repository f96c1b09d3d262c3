//! Saving and restoring simulation state

pub mod snapshot;

pub use snapshot::{SnapshotCodec, FORMAT_VERSION};
