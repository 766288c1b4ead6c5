// rangefinder_core/src/error.rs

use thiserror::Error;

pub type Result<T, E = GeometryError> = std::result::Result<T, E>;

/// Numeric and geometric degeneracies. These are always recoverable: callers
/// skip the offending element or fall back to an empty result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("input is empty")]
    EmptyInput,

    #[error("need at least {needed} points, got {got}")]
    InsufficientPoints { needed: usize, got: usize },

    #[error("segment endpoints coincide")]
    ZeroLengthSegment,

    #[error("predictor variance is zero")]
    ZeroVariance,

    #[error("all points are collinear, no hull exists")]
    DegenerateHull,

    #[error("value is not finite")]
    NonFinite,
}

/// Structural problems with an arena description, reported at start-up.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArenaError {
    #[error("arena half-size must be positive and finite, got {0}")]
    InvalidArenaSize(f64),

    #[error("rock diameter must be non-negative and finite, got {0}")]
    InvalidRockDiameter(f64),

    #[error("dead angle range [{low}, {high}] is not a valid interval")]
    InvalidDeadAngle { low: f64, high: f64 },
}

/// Invalid sweep parameters, reported before any ray is cast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("jitter must be non-negative and finite, got {0}")]
    InvalidJitter(f64),

    #[error("glitch rate must lie in [0, 1], got {0}")]
    InvalidGlitchRate(f64),

    #[error("angle range [{start}, {end}) is empty or not finite")]
    InvalidAngleRange { start: f64, end: f64 },
}

/// Classifier settings that cannot produce a meaningful result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("window fraction must lie in (0, 1], got {0}")]
    InvalidWindowFraction(f64),

    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}
