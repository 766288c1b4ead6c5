// rangefinder_sim/src/config/structs.rs

use super::serde_helpers;
use rangefinder_core::arena::DeadAngleRange;
use rangefinder_core::classify::ClassifierSettings;
use rangefinder_core::geometry::Point;
use rangefinder_core::raycast::NoiseConfig;
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file. Every section is
/// optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: Simulation,

    #[serde(default)]
    pub arena: ArenaConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub noise: NoiseConfig,

    #[serde(default)]
    pub classifier: ClassifierSettings,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ArenaConfig {
    /// Full side length of the square arena.
    pub side_size: f64,
    /// Number of randomly placed rocks. Ignored when `rocks` is non-empty.
    pub rock_count: usize,
    /// Diameter of every random rock; `0` draws each from `[0, 1)`.
    pub rock_diameter: f64,
    /// Explicit rock placement.
    pub rocks: Vec<RockConfig>,
    pub robot: RobotConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            side_size: 12.0,
            rock_count: 5,
            rock_diameter: 0.0,
            rocks: Vec::new(),
            robot: RobotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RockConfig {
    #[serde(with = "serde_helpers::point2_from_array")]
    pub center: Point,
    pub diameter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RobotConfig {
    #[serde(with = "serde_helpers::point2_from_array")]
    pub position: Point,
    /// Radians, counter-clockwise from +X.
    pub heading: f64,
    /// Blind spots in the robot frame, as `[low, high]` radian pairs.
    #[serde(with = "serde_helpers::dead_angles_from_pairs")]
    pub dead_angles: Vec<DeadAngleRange>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            position: Point::origin(),
            heading: 0.0,
            dead_angles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ScanConfig {
    /// Number of casting workers, one angular band each.
    pub workers: usize,
    /// Rays per full revolution, split across the bands.
    pub point_count: usize,
    /// Fine marching step. Defaults to `side_size / 1000`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_size: Option<f64>,
    /// How long the coordinator waits for a band before giving up on the
    /// cycle. Absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_timeout_ms: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            point_count: 800,
            step_size: None,
            worker_timeout_ms: None,
        }
    }
}
