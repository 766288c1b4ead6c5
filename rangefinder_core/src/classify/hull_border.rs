// rangefinder_core/src/classify/hull_border.rs

use super::hull::ConvexHull;
use super::poi::{PoiColor, PointOfInterest};
use super::{Classification, ClassificationStrategy};
use crate::geometry::Point;

/// Rejects every point lying within `threshold` of the scan's convex hull.
///
/// In an enclosed arena the hull approximates the outer walls, so what is
/// left after suppression is the interior structure: rocks and anything else
/// standing off the walls. Hull edges are reported as white segments.
#[derive(Debug, Clone)]
pub struct HullBorder {
    threshold: f64,
}

impl HullBorder {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl ClassificationStrategy for HullBorder {
    fn name(&self) -> &'static str {
        "hull_border"
    }

    fn classify(&self, points: &[Point]) -> Classification {
        if points.len() < 2 {
            return Classification::empty();
        }
        let hull = match ConvexHull::compute(points) {
            Ok(hull) => hull,
            Err(e) => {
                tracing::debug!(error = %e, points = points.len(), "no hull, skipping frame");
                return Classification::empty();
            }
        };

        let mut out = Classification::empty();
        for p in points {
            if hull.distance_to_boundary(p) <= self.threshold {
                out.rejected.push(*p);
            } else {
                out.accepted.push(*p);
            }
        }
        out.points_of_interest = hull
            .edges()
            .map(|(start, end)| PointOfInterest::Segment {
                start,
                end,
                color: PoiColor::White,
            })
            .collect();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_with_center() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(0.5, 0.5),
        ]
    }

    #[test]
    fn corners_are_border_and_center_is_kept() {
        let out = HullBorder::new(0.15).classify(&square_with_center());
        assert_eq!(out.rejected.len(), 4);
        assert_eq!(out.accepted, vec![Point::new(0.5, 0.5)]);
        assert_eq!(out.points_of_interest.len(), 4);
        assert!(out.points_of_interest.iter().all(|p| p.is_segment()));
    }

    #[test]
    fn points_near_walls_are_rejected() {
        let mut points = square_with_center();
        points.push(Point::new(0.5, 0.1));
        points.push(Point::new(0.95, 0.5));
        points.push(Point::new(0.3, 0.4));
        let out = HullBorder::new(0.15).classify(&points);
        assert!(out.rejected.contains(&Point::new(0.5, 0.1)));
        assert!(out.rejected.contains(&Point::new(0.95, 0.5)));
        assert!(out.accepted.contains(&Point::new(0.3, 0.4)));
        assert_eq!(out.accepted.len() + out.rejected.len(), points.len());
    }

    #[test]
    fn tiny_or_collinear_input_is_empty() {
        let strategy = HullBorder::new(0.15);
        assert!(strategy.classify(&[]).is_empty());
        assert!(strategy.classify(&[Point::new(1.0, 1.0)]).is_empty());
        let line: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 0.0)).collect();
        assert!(strategy.classify(&line).is_empty());
    }
}
