// rangefinder_sim/src/prelude.rs

// This prelude is for convenience for binaries and tests using the runtime.
pub use crate::cli::Cli;
pub use crate::config::{load_scenario, ConfigOverrides, ScenarioConfig};
pub use crate::error::{Result, SimError};
pub use crate::pipeline::{
    ClassifiedFrame, ClassifierPipeline, LatestSlot, ScanPipeline, ScanSettings, SharedArena,
};
pub use crate::prng::{resolve_seed, SimulationRng};
pub use rangefinder_core::prelude::*;
