// rangefinder_core/src/classify/cluster_regression.rs

use super::clustering::{detect_clusters, Cluster, ClusterParams};
use super::poi::{PoiColor, PointOfInterest};
use super::regression::{best_fit, FitOrientation, LineFit};
use super::{Classification, ClassificationStrategy};
use crate::geometry::Point;

/// One surviving cluster together with its best line fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFit {
    pub cluster: Cluster,
    pub fit: LineFit,
}

/// Segments the scan into clusters and fits a line through each one.
///
/// Every fitted cluster contributes a line segment plus a marker per member,
/// all in the cluster's palette color. Accepted and rejected stay empty: this
/// strategy only describes structure, it does not filter.
#[derive(Debug, Clone)]
pub struct ClusterRegression {
    params: ClusterParams,
    line_half_span: f64,
}

impl ClusterRegression {
    pub fn new(params: ClusterParams, line_half_span: f64) -> Self {
        Self {
            params,
            line_half_span,
        }
    }

    /// Clusters that admit a line fit. Degenerate clusters are skipped.
    pub fn fit_clusters(&self, points: &[Point]) -> Vec<ClusterFit> {
        let clusters = match detect_clusters(points, &self.params) {
            Ok(clusters) => clusters,
            Err(e) => {
                tracing::debug!(error = %e, "clustering failed");
                return Vec::new();
            }
        };

        clusters
            .into_iter()
            .filter_map(|cluster| match best_fit(cluster.points(points)) {
                Ok(fit) => Some(ClusterFit { cluster, fit }),
                Err(e) => {
                    tracing::debug!(range = ?cluster.range, error = %e, "skipping cluster");
                    None
                }
            })
            .collect()
    }
}

/// Mean predictor value of the cluster in the fit's orientation.
fn predictor_center(members: &[Point], orientation: FitOrientation) -> f64 {
    let sum: f64 = members
        .iter()
        .map(|p| match orientation {
            FitOrientation::Native => p.x,
            FitOrientation::Swapped => p.y,
        })
        .sum();
    sum / members.len() as f64
}

impl ClassificationStrategy for ClusterRegression {
    fn name(&self) -> &'static str {
        "cluster_regression"
    }

    fn classify(&self, points: &[Point]) -> Classification {
        if points.len() < 2 {
            return Classification::empty();
        }
        let fits = self.fit_clusters(points);
        if fits.len() < 2 {
            tracing::debug!(clusters = fits.len(), "not enough clusters to classify");
            return Classification::empty();
        }

        let mut out = Classification::empty();
        for (i, ClusterFit { cluster, fit }) in fits.iter().enumerate() {
            let color = PoiColor::cycle(i);
            let members = cluster.points(points);
            let center = predictor_center(members, fit.orientation);
            let (start, end) = fit.span(center - self.line_half_span, center + self.line_half_span);
            out.points_of_interest
                .push(PointOfInterest::Segment { start, end, color });
            out.points_of_interest.extend(
                members
                    .iter()
                    .map(|&point| PointOfInterest::Marker { point, color }),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// A vertical wall followed by a horizontal one, well separated.
    fn two_walls() -> Vec<Point> {
        let mut points: Vec<Point> = (0..20)
            .map(|i| Point::new(1.0, -1.0 + 0.1 * i as f64))
            .collect();
        points.extend((0..20).map(|i| Point::new(2.0 + 0.1 * i as f64, 3.0)));
        points
    }

    fn strategy() -> ClusterRegression {
        ClusterRegression::new(
            ClusterParams {
                window_fraction: 0.25,
                ..ClusterParams::default()
            },
            15.0,
        )
    }

    #[test]
    fn each_wall_gets_its_own_line() {
        let fits = strategy().fit_clusters(&two_walls());
        assert_eq!(fits.len(), 2);

        assert_eq!(fits[0].fit.orientation, FitOrientation::Swapped);
        assert_abs_diff_eq!(fits[0].fit.intercept, 1.0, epsilon = 1e-9);
        assert_eq!(fits[1].fit.orientation, FitOrientation::Native);
        assert_abs_diff_eq!(fits[1].fit.intercept, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn poi_has_a_segment_and_markers_per_cluster() {
        let out = strategy().classify(&two_walls());
        assert!(out.accepted.is_empty());
        assert!(out.rejected.is_empty());

        let segments: Vec<_> = out.points_of_interest.iter().filter(|p| p.is_segment()).collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(out.points_of_interest.len(), 2 + 40);

        assert_eq!(segments[0].color(), PoiColor::cycle(0));
        assert_eq!(segments[1].color(), PoiColor::cycle(1));
        if let PointOfInterest::Segment { start, end, .. } = segments[0] {
            assert_abs_diff_eq!(start.x, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(end.x, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!((end - start).norm(), 30.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn a_single_cluster_yields_nothing() {
        let points: Vec<Point> = (0..30).map(|i| Point::new(0.1 * i as f64, 2.0)).collect();
        assert!(strategy().classify(&points).is_empty());
    }

    #[test]
    fn too_few_points_yield_nothing() {
        assert!(strategy().classify(&[Point::new(0.0, 0.0)]).is_empty());
        assert!(strategy()
            .classify(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
            .is_empty());
    }
}
