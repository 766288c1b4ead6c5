// rangefinder_sim/src/error.rs

use rangefinder_core::error::{ArenaError, SettingsError, SweepError};

pub type Result<T> = std::result::Result<T, SimError>;

/// Errors surfaced by the runtime: configuration problems at start-up and
/// pipeline failures afterwards.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid arena: {0}")]
    Arena(#[from] ArenaError),

    #[error("invalid sweep parameters: {0}")]
    Sweep(#[from] SweepError),

    #[error("invalid classifier settings: {0}")]
    Classifier(#[from] SettingsError),

    #[error("at least one scan worker is required")]
    NoScanWorkers,

    #[error("point count must be at least the worker count ({workers}), got {points}")]
    NoScanPoints { points: usize, workers: usize },

    #[error("failed to spawn thread '{name}': {source}")]
    WorkerSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cycle {cycle}: workers {missing:?} did not report in time")]
    WorkerStalled { cycle: u64, missing: Vec<usize> },

    #[error("pipeline channel disconnected")]
    PipelineDisconnected,
}

impl From<figment::Error> for SimError {
    fn from(e: figment::Error) -> Self {
        SimError::Config(Box::new(e))
    }
}
