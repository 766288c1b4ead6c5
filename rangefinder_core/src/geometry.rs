// rangefinder_core/src/geometry.rs

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A 2D location. Always stored as Cartesian coordinates.
pub type Point = Point2<f64>;

/// A location expressed as (radius, angle). Angles are radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarCoord {
    pub radius: f64,
    pub angle: f64,
}

impl PolarCoord {
    pub fn new(radius: f64, angle: f64) -> Self {
        Self { radius, angle }
    }

    pub fn to_point(self) -> Point {
        Point::from_polar(self.radius, self.angle)
    }
}

/// Conversion between Cartesian and polar representations.
pub trait Polar: Sized {
    fn from_polar(radius: f64, angle: f64) -> Self;

    /// Returns the polar form. The angle lies in (-π, π] following `atan2`,
    /// and the origin maps to an angle of 0.
    fn to_polar(&self) -> PolarCoord;
}

impl Polar for Point {
    fn from_polar(radius: f64, angle: f64) -> Self {
        Point::new(radius * angle.cos(), radius * angle.sin())
    }

    fn to_polar(&self) -> PolarCoord {
        PolarCoord {
            radius: self.coords.norm(),
            angle: self.y.atan2(self.x),
        }
    }
}

/// Unit direction vector for a heading.
#[inline]
pub fn direction(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

/// Wraps an angle into `[0, 2π)`.
#[inline]
pub fn wrap_to_tau(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Z component of `(b - a) x (p - a)`. Positive when `p` is left of `a -> b`.
#[inline]
pub fn cross(a: &Point, b: &Point, p: &Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    ab.x * ap.y - ab.y * ap.x
}
