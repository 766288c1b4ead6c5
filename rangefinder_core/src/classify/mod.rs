// rangefinder_core/src/classify/mod.rs

pub mod clustering;
pub mod hull;
pub mod poi;
pub mod regression;

mod cluster_regression;
mod hull_border;
mod slope_continuity;

use crate::error::SettingsError;
use crate::geometry::Point;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use cluster_regression::{ClusterFit, ClusterRegression};
pub use clustering::{Cluster, ClusterParams};
pub use hull::ConvexHull;
pub use hull_border::HullBorder;
pub use poi::{PoiColor, PointOfInterest};
pub use slope_continuity::SlopeContinuity;

// =========================================================================
// == Classifier Output ==
// =========================================================================

/// The result of one classification pass, published to consumers as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Points considered usable for mapping.
    pub accepted: Vec<Point>,
    /// Border or noise points.
    pub rejected: Vec<Point>,
    pub points_of_interest: Vec<PointOfInterest>,
}

impl Classification {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty() && self.points_of_interest.is_empty()
    }
}

// =========================================================================
// == Strategy Contract ==
// =========================================================================

/// The contract for any algorithm that splits an angle-ordered scan (robot
/// frame, Cartesian) into accepted points, rejected points and features.
///
/// Implementations never fail: degenerate or insufficient input yields an
/// empty or partial [`Classification`].
pub trait ClassificationStrategy: Send + Sync + DynClone + Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn classify(&self, points: &[Point]) -> Classification;
}

dyn_clone::clone_trait_object!(ClassificationStrategy);

// =========================================================================
// == Settings ==
// =========================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    HullBorder,
    ClusterRegression,
    SlopeContinuity,
}

/// Tuning shared by all strategies. Each strategy reads only its own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClassifierSettings {
    pub strategy: StrategyKind,
    pub window_fraction: f64,
    pub boundary_factor: f64,
    pub min_cluster_len: usize,
    /// Distance to the hull below which a point counts as border noise.
    pub border_threshold: f64,
    /// Fitted lines are drawn this far either side of the cluster start.
    pub line_half_span: f64,
    pub slope_tolerance: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        let cluster = ClusterParams::default();
        Self {
            strategy: StrategyKind::default(),
            window_fraction: cluster.window_fraction,
            boundary_factor: cluster.boundary_factor,
            min_cluster_len: cluster.min_cluster_len,
            border_threshold: 0.15,
            line_half_span: 15.0,
            slope_tolerance: 1.0,
        }
    }
}

impl ClassifierSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.window_fraction > 0.0 && self.window_fraction <= 1.0) {
            return Err(SettingsError::InvalidWindowFraction(self.window_fraction));
        }
        let positive = [
            ("boundary_factor", self.boundary_factor),
            ("border_threshold", self.border_threshold),
            ("line_half_span", self.line_half_span),
            ("slope_tolerance", self.slope_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::NotPositive { name, value });
            }
        }
        Ok(())
    }

    pub fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            window_fraction: self.window_fraction,
            boundary_factor: self.boundary_factor,
            min_cluster_len: self.min_cluster_len,
        }
    }
}

/// Builds the strategy selected in `settings`.
pub fn build_strategy(settings: &ClassifierSettings) -> Box<dyn ClassificationStrategy> {
    match settings.strategy {
        StrategyKind::HullBorder => Box::new(HullBorder::new(settings.border_threshold)),
        StrategyKind::ClusterRegression => Box::new(ClusterRegression::new(
            settings.cluster_params(),
            settings.line_half_span,
        )),
        StrategyKind::SlopeContinuity => Box::new(SlopeContinuity::new(settings.slope_tolerance)),
    }
}
