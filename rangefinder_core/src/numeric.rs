// rangefinder_core/src/numeric.rs

//! Small statistics helpers shared by the classifiers.
//!
//! Every function reports degenerate input as a [`GeometryError`] instead of
//! producing NaN or infinity.

use crate::error::{GeometryError, Result};
use crate::geometry::Point;
use num_traits::Float;

pub fn mean<T: Float>(values: &[T]) -> Result<T> {
    if values.is_empty() {
        return Err(GeometryError::EmptyInput);
    }
    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);
    let n = T::from(values.len()).ok_or(GeometryError::NonFinite)?;
    Ok(sum / n)
}

/// Median via a sorted copy. Even-length input averages the two middle values.
pub fn median<T: Float>(values: &[T]) -> Result<T> {
    if values.is_empty() {
        return Err(GeometryError::EmptyInput);
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(GeometryError::NonFinite);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let two = T::one() + T::one();
        Ok((sorted[mid - 1] + sorted[mid]) / two)
    } else {
        Ok(sorted[mid])
    }
}

/// Population standard deviation.
pub fn std_dev<T: Float>(values: &[T]) -> Result<T> {
    let mu = mean(values)?;
    let squares: Vec<T> = values.iter().map(|&v| (v - mu) * (v - mu)).collect();
    Ok(mean(&squares)?.sqrt())
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
pub fn perpendicular_deviation(a: &Point, b: &Point, p: &Point) -> Result<f64> {
    let ab = b - a;
    let len = ab.norm();
    if len <= f64::EPSILON {
        return Err(GeometryError::ZeroLengthSegment);
    }
    let ap = p - a;
    Ok((ab.x * ap.y - ab.y * ap.x).abs() / len)
}

/// Distance from `p` to the closed segment `a`-`b`. A zero-length segment
/// degrades to the distance to `a`.
pub fn segment_distance(a: &Point, b: &Point, p: &Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
