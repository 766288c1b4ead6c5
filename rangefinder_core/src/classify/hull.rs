// rangefinder_core/src/classify/hull.rs

//! Divide-and-conquer convex hull and a parity-rule containment test.

use crate::error::{GeometryError, Result};
use crate::geometry::{cross, Point};
use crate::numeric::{perpendicular_deviation, segment_distance};
use std::cmp::Ordering;

/// Points closer to a hull edge line than this count as lying on it.
const SIDE_EPSILON: f64 = 1e-12;

/// A convex polygon, vertices in clockwise order starting at the leftmost point.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point>,
}

impl ConvexHull {
    /// Builds the hull of `points`.
    ///
    /// The leftmost and rightmost points split the set into an upper and a
    /// lower half. Each half is refined edge by edge: the candidate furthest
    /// from the edge becomes a hull vertex, candidates inside the triangle it
    /// forms with the edge are dropped, and the rest are handed to whichever
    /// of the two new edges they lie outside of.
    pub fn compute(points: &[Point]) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeometryError::InsufficientPoints {
                needed: 3,
                got: points.len(),
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let by_x_then_y = |a: &&Point, b: &&Point| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
        };
        let left = *points
            .iter()
            .min_by(by_x_then_y)
            .ok_or(GeometryError::EmptyInput)?;
        let right = *points
            .iter()
            .max_by(by_x_then_y)
            .ok_or(GeometryError::EmptyInput)?;
        if left == right {
            return Err(GeometryError::DegenerateHull);
        }

        let upper: Vec<Point> = points
            .iter()
            .filter(|p| cross(&left, &right, p) > SIDE_EPSILON)
            .copied()
            .collect();
        let lower: Vec<Point> = points
            .iter()
            .filter(|p| cross(&right, &left, p) > SIDE_EPSILON)
            .copied()
            .collect();
        if upper.is_empty() && lower.is_empty() {
            return Err(GeometryError::DegenerateHull);
        }

        let mut edges = Vec::new();
        expand(left, right, upper, &mut edges)?;
        expand(right, left, lower, &mut edges)?;

        Ok(Self {
            vertices: edges.into_iter().map(|(start, _)| start).collect(),
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Closed edge loop: the last edge returns to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn contains(&self, point: &Point) -> bool {
        ray_cast_intersect_contains(&self.vertices, point)
    }

    /// Shortest distance from `point` to any hull edge.
    pub fn distance_to_boundary(&self, point: &Point) -> f64 {
        self.edges()
            .map(|(a, b)| segment_distance(&a, &b, point))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Emits the hull edges between `a` and `b` (in that order) that bound
/// `candidates`, all of which lie strictly left of `a -> b`.
fn expand(a: Point, b: Point, candidates: Vec<Point>, edges: &mut Vec<(Point, Point)>) -> Result<()> {
    if candidates.is_empty() {
        edges.push((a, b));
        return Ok(());
    }

    let mut farthest = candidates[0];
    let mut best = f64::NEG_INFINITY;
    for p in &candidates {
        let d = perpendicular_deviation(&a, &b, p)?;
        if d > best {
            best = d;
            farthest = *p;
        }
    }

    let triangle = [a, farthest, b];
    let outside: Vec<Point> = candidates
        .into_iter()
        .filter(|p| *p != farthest && !ray_cast_intersect_contains(&triangle, p))
        .collect();

    let left_of_first: Vec<Point> = outside
        .iter()
        .filter(|p| cross(&a, &farthest, p) > SIDE_EPSILON)
        .copied()
        .collect();
    let left_of_second: Vec<Point> = outside
        .iter()
        .filter(|p| cross(&farthest, &b, p) > SIDE_EPSILON)
        .copied()
        .collect();

    expand(a, farthest, left_of_first, edges)?;
    expand(farthest, b, left_of_second, edges)
}

/// Even-odd containment test with a ray cast towards +X.
///
/// An edge is crossed when the point's y lies strictly between the edge's
/// endpoint y values and the edge is to the right of the point: either
/// entirely, or at the height of the point.
pub fn ray_cast_intersect_contains(polygon: &[Point], point: &Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let (y_lo, y_hi) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
        if !(point.y > y_lo && point.y < y_hi) {
            continue;
        }
        if point.x < a.x.min(b.x) {
            inside = !inside;
        } else if point.x < a.x.max(b.x) {
            let x_at = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x_at > point.x {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_square_with_center() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(0.5, 0.5),
        ]
    }

    #[test]
    fn square_hull_has_exactly_the_corners() {
        let hull = ConvexHull::compute(&unit_square_with_center()).unwrap();
        let vertices = hull.vertices();
        assert_eq!(vertices.len(), 4);
        for corner in &unit_square_with_center()[..4] {
            assert!(vertices.contains(corner));
        }
        assert!(!vertices.contains(&Point::new(0.5, 0.5)));
    }

    #[test]
    fn square_hull_contains_its_center() {
        let hull = ConvexHull::compute(&unit_square_with_center()).unwrap();
        assert!(hull.contains(&Point::new(0.5, 0.5)));
        assert!(!hull.contains(&Point::new(1.5, 0.5)));
        assert!(!hull.contains(&Point::new(-0.5, 0.5)));
    }

    #[test]
    fn hull_is_clockwise_from_leftmost() {
        let hull = ConvexHull::compute(&unit_square_with_center()).unwrap();
        assert_eq!(hull.vertices()[0], Point::new(0.0, 0.0));
        assert_eq!(hull.vertices()[1], Point::new(0.0, 1.0));
        assert_eq!(hull.vertices()[2], Point::new(1.0, 1.0));
        assert_eq!(hull.vertices()[3], Point::new(1.0, 0.0));
    }

    #[test]
    fn hull_of_ring_keeps_every_ring_point() {
        let mut points: Vec<Point> = (0..16)
            .map(|i| {
                let a = i as f64 / 16.0 * std::f64::consts::TAU;
                Point::new(2.0 * a.cos(), 2.0 * a.sin())
            })
            .collect();
        points.push(Point::new(0.1, -0.3));
        points.push(Point::new(-1.0, 0.5));
        let hull = ConvexHull::compute(&points).unwrap();
        assert_eq!(hull.vertices().len(), 16);
        assert_eq!(hull.edges().count(), 16);
    }

    #[test]
    fn hull_of_scattered_cloud_encloses_every_point() {
        // Deterministic scatter inside a 4x3 box, plus the four extreme corners.
        let mut points: Vec<Point> = (0..60)
            .map(|i| {
                let t = i as f64;
                Point::new(0.2 + (t * 0.618).fract() * 3.6, 0.2 + (t * 0.414).fract() * 2.6)
            })
            .collect();
        points.extend([
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 3.0),
            Point::new(0.0, 3.0),
        ]);
        let hull = ConvexHull::compute(&points).unwrap();
        assert_eq!(hull.vertices().len(), 4);
        for p in &points[..60] {
            assert!(hull.contains(p), "{p:?} is outside the hull");
            assert!(hull.distance_to_boundary(p) >= 0.2 - 1e-9);
        }
    }

    #[test]
    fn distance_to_boundary_of_square() {
        let hull = ConvexHull::compute(&unit_square_with_center()).unwrap();
        assert_abs_diff_eq!(hull.distance_to_boundary(&Point::new(0.5, 0.5)), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hull.distance_to_boundary(&Point::new(0.9, 0.5)), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(hull.distance_to_boundary(&Point::new(1.0, 1.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points_have_no_hull() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
        assert_eq!(ConvexHull::compute(&points), Err(GeometryError::DegenerateHull));
    }

    #[test]
    fn too_few_points_have_no_hull() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        assert!(matches!(
            ConvexHull::compute(&points),
            Err(GeometryError::InsufficientPoints { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn containment_in_concave_polygon() {
        // A "U" shape opening upwards.
        let polygon = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(2.0, 3.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 3.0),
            Point::new(0.0, 3.0),
        ];
        assert!(ray_cast_intersect_contains(&polygon, &Point::new(0.5, 2.0)));
        assert!(ray_cast_intersect_contains(&polygon, &Point::new(2.5, 2.0)));
        assert!(!ray_cast_intersect_contains(&polygon, &Point::new(1.5, 2.0)));
        assert!(ray_cast_intersect_contains(&polygon, &Point::new(1.5, 0.5)));
    }
}
