use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlimeError {
    #[error("Invalid {name}: {value} (allowed {min}..={max})")]
    InvalidParameter {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("Snapshot format error: {0}")]
    SnapshotFormat(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SlimeError {
    /// Check `value` against an inclusive range, naming the parameter on failure
    pub fn check_range(name: &'static str, value: u64, min: u64, max: u64) -> Result<()> {
        if value < min || value > max {
            return Err(SlimeError::InvalidParameter {
                name,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, SlimeError>;
