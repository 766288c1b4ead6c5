// rangefinder_core/src/classify/slope_continuity.rs

use super::{Classification, ClassificationStrategy};
use crate::geometry::Point;

/// Accepts a point when the slope from its predecessor and the slope to its
/// successor agree within `tolerance`. Neighbours wrap around the scan.
///
/// A vertical neighbour pair has no slope; the point is rejected.
#[derive(Debug, Clone)]
pub struct SlopeContinuity {
    tolerance: f64,
}

impl SlopeContinuity {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

fn slope(a: &Point, b: &Point) -> Option<f64> {
    let dx = b.x - a.x;
    if dx.abs() <= f64::EPSILON {
        return None;
    }
    Some((b.y - a.y) / dx)
}

impl ClassificationStrategy for SlopeContinuity {
    fn name(&self) -> &'static str {
        "slope_continuity"
    }

    fn classify(&self, points: &[Point]) -> Classification {
        let n = points.len();
        if n < 3 {
            return Classification::empty();
        }

        let mut out = Classification::empty();
        for i in 0..n {
            let prev = &points[(i + n - 1) % n];
            let here = &points[i];
            let next = &points[(i + 1) % n];
            let smooth = match (slope(prev, here), slope(here, next)) {
                (Some(s1), Some(s2)) => (s1 - s2).abs() < self.tolerance,
                _ => false,
            };
            if smooth {
                out.accepted.push(*here);
            } else {
                out.rejected.push(*here);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_run_is_accepted_and_corners_rejected() {
        // Two sides of a right-angled corner, closed back to the start.
        let mut points: Vec<Point> = (0..6).map(|i| Point::new(i as f64, 0.0)).collect();
        points.extend((1..6).map(|i| Point::new(5.0 - 0.5 * i as f64, 2.0 * i as f64)));
        let out = SlopeContinuity::new(1.0).classify(&points);

        assert!(out.accepted.contains(&Point::new(2.0, 0.0)));
        assert!(out.rejected.contains(&Point::new(5.0, 0.0)));
        assert!(out.rejected.contains(&Point::new(0.0, 0.0)));
        assert_eq!(out.accepted.len() + out.rejected.len(), points.len());
        assert!(out.points_of_interest.is_empty());
    }

    #[test]
    fn vertical_neighbours_are_rejected() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 2.0),
            Point::new(1.0, 2.0),
        ];
        let out = SlopeContinuity::new(1.0).classify(&points);
        assert!(out.rejected.contains(&Point::new(0.0, 1.0)));
    }

    #[test]
    fn fewer_than_three_points_is_empty() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert!(SlopeContinuity::new(1.0).classify(&points).is_empty());
    }
}
