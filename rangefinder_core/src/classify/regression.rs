// rangefinder_core/src/classify/regression.rs

//! Ordinary least squares line fitting with axis selection.
//!
//! Lidar walls can be vertical, where `y = f(x)` is undefined, so every
//! cluster is fitted twice: once as `y = m·x + b` and once with the axes
//! swapped as `x = m·y + b`. The orientation with the higher R² wins.
//!
//! For a plain OLS fit R² equals the squared correlation in either
//! orientation, so the two scores usually agree to rounding. Near-ties are
//! settled by the predictor spread: the axis along which the points extend
//! further gives the better-conditioned slope.

use crate::error::{GeometryError, Result};
use crate::geometry::Point;
use crate::numeric::mean;

/// R² values closer than this are treated as equal.
const R_SQUARED_TIE: f64 = 1e-9;

/// Which coordinate acts as the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOrientation {
    /// `y = slope * x + intercept`
    Native,
    /// `x = slope * y + intercept`
    Swapped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    pub orientation: FitOrientation,
    /// Sum of squared predictor deviations.
    pub predictor_spread: f64,
}

impl LineFit {
    /// The point on the line at predictor value `t`.
    pub fn at(&self, t: f64) -> Point {
        let v = self.slope * t + self.intercept;
        match self.orientation {
            FitOrientation::Native => Point::new(t, v),
            FitOrientation::Swapped => Point::new(v, t),
        }
    }

    /// Segment endpoints for predictor values `from` and `to`.
    pub fn span(&self, from: f64, to: f64) -> (Point, Point) {
        (self.at(from), self.at(to))
    }
}

/// Fits a line in the given orientation.
///
/// Zero predictor variance has no slope and is an error. Zero response
/// variance with a valid predictor means the points lie exactly on the line,
/// which is reported as R² = 1.
pub fn fit_line(points: &[Point], orientation: FitOrientation) -> Result<LineFit> {
    if points.len() < 2 {
        return Err(GeometryError::InsufficientPoints {
            needed: 2,
            got: points.len(),
        });
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = points
        .iter()
        .map(|p| match orientation {
            FitOrientation::Native => (p.x, p.y),
            FitOrientation::Swapped => (p.y, p.x),
        })
        .unzip();

    let x_mean = mean(&xs)?;
    let y_mean = mean(&ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean) * (x - x_mean);
    }
    if sxx <= f64::EPSILON {
        return Err(GeometryError::ZeroVariance);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let residual = y - (slope * x + intercept);
        ss_res += residual * residual;
        ss_tot += (y - y_mean) * (y - y_mean);
    }
    let r_squared = if ss_tot <= f64::EPSILON {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    if !slope.is_finite() || !intercept.is_finite() || !r_squared.is_finite() {
        return Err(GeometryError::NonFinite);
    }

    Ok(LineFit {
        slope,
        intercept,
        r_squared,
        orientation,
        predictor_spread: sxx,
    })
}

/// Fits both orientations and keeps the one with the higher R².
pub fn best_fit(points: &[Point]) -> Result<LineFit> {
    let native = fit_line(points, FitOrientation::Native);
    let swapped = fit_line(points, FitOrientation::Swapped);
    match (native, swapped) {
        (Ok(n), Ok(s)) => Ok(pick(n, s)),
        (Ok(n), Err(_)) => Ok(n),
        (Err(_), Ok(s)) => Ok(s),
        (Err(e), Err(_)) => Err(e),
    }
}

fn pick(native: LineFit, swapped: LineFit) -> LineFit {
    if (swapped.r_squared - native.r_squared).abs() > R_SQUARED_TIE {
        if swapped.r_squared > native.r_squared {
            swapped
        } else {
            native
        }
    } else if swapped.predictor_spread > native.predictor_spread {
        swapped
    } else {
        native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn collinear_points_fit_exactly() {
        let fit = fit_line(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]), FitOrientation::Native)
            .unwrap();
        assert_abs_diff_eq!(fit.slope, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vertical_line_needs_swapped_axes() {
        let points = pts(&[(2.0, 0.0), (2.0, 1.0), (2.0, 2.0), (2.0, 3.0)]);
        assert_eq!(
            fit_line(&points, FitOrientation::Native),
            Err(GeometryError::ZeroVariance)
        );
        let fit = best_fit(&points).unwrap();
        assert_eq!(fit.orientation, FitOrientation::Swapped);
        assert_abs_diff_eq!(fit.slope, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.at(5.0).x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_line_is_a_perfect_native_fit() {
        let points = pts(&[(0.0, 1.5), (1.0, 1.5), (2.0, 1.5)]);
        let fit = best_fit(&points).unwrap();
        assert_eq!(fit.orientation, FitOrientation::Native);
        assert_abs_diff_eq!(fit.r_squared, 1.0);
        assert_abs_diff_eq!(fit.intercept, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn steep_noisy_wall_prefers_swapped_orientation() {
        let points = pts(&[
            (3.00, -2.0),
            (3.05, -1.0),
            (2.97, 0.0),
            (3.02, 1.0),
            (2.99, 2.0),
        ]);
        let fit = best_fit(&points).unwrap();
        assert_eq!(fit.orientation, FitOrientation::Swapped);
        assert!(fit.r_squared < 1.0);
    }

    #[test]
    fn diagonal_tie_stays_native() {
        let fit = best_fit(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])).unwrap();
        assert_eq!(fit.orientation, FitOrientation::Native);
    }

    #[test]
    fn single_point_or_coincident_points_fail() {
        assert!(matches!(
            best_fit(&pts(&[(1.0, 1.0)])),
            Err(GeometryError::InsufficientPoints { needed: 2, got: 1 })
        ));
        assert_eq!(
            best_fit(&pts(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)])),
            Err(GeometryError::ZeroVariance)
        );
    }
}
