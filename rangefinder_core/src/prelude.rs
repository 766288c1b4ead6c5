// rangefinder_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::classify::{build_strategy, Classification, ClassificationStrategy};

// --- Core Data Structures ---
pub use crate::arena::{Arena, DeadAngleRange, Rock, RobotPose};
pub use crate::geometry::{Point, Polar, PolarCoord};
pub use crate::messages::ScanFrame;

// --- Settings ---
pub use crate::classify::{ClassifierSettings, StrategyKind};
pub use crate::raycast::{AngleBand, NoiseConfig, SweepParams};

// --- Errors ---
pub use crate::error::{ArenaError, GeometryError, SettingsError, SweepError};

// --- Ray Casting ---
pub use crate::raycast::{cast_ray, scan_sweep, SweepOutput};
