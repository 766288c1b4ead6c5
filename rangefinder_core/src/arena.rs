// rangefinder_core/src/arena.rs

//! The world the rangefinder looks at: a square arena centred on the origin,
//! a set of circular rocks, and the robot carrying the sensor.
//!
//! An [`Arena`] is a plain value. Casting workers receive their own copy each
//! cycle, so nothing in here needs interior mutability.

use crate::error::ArenaError;
use crate::geometry::{wrap_to_tau, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// =========================================================================
// == Obstacles ==
// =========================================================================

/// A circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    pub center: Point,
    pub diameter: f64,
}

impl Rock {
    pub fn new(center: Point, diameter: f64) -> Self {
        Self { center, diameter }
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Strict containment: a point exactly on the rim is outside.
    pub fn contains(&self, point: &Point) -> bool {
        let r = self.radius();
        (point - self.center).norm_squared() < r * r
    }
}

// =========================================================================
// == Robot ==
// =========================================================================

/// An angular range the sensor cannot see, in the robot's own frame.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadAngleRange {
    pub low: f64,
    pub high: f64,
}

impl DeadAngleRange {
    pub fn new(low: f64, high: f64) -> Result<Self, ArenaError> {
        if !low.is_finite() || !high.is_finite() || high < low {
            return Err(ArenaError::InvalidDeadAngle { low, high });
        }
        Ok(Self { low, high })
    }

    /// `relative` must already be wrapped into `[0, 2π)`.
    pub fn contains(&self, relative: f64) -> bool {
        if self.high - self.low >= TAU {
            return true;
        }
        let low = wrap_to_tau(self.low);
        let high = wrap_to_tau(self.high);
        if low <= high {
            low <= relative && relative <= high
        } else {
            // The range straddles the robot's zero direction.
            relative >= low || relative <= high
        }
    }
}

/// Robot position, heading and blind spots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotPose {
    pub position: Point,
    /// Heading in radians, counter-clockwise from +X.
    pub heading: f64,
    pub dead_angles: Vec<DeadAngleRange>,
}

impl RobotPose {
    pub fn new(position: Point, heading: f64) -> Self {
        Self {
            position,
            heading,
            dead_angles: Vec::new(),
        }
    }

    pub fn with_dead_angles(mut self, dead_angles: Vec<DeadAngleRange>) -> Self {
        self.dead_angles = dead_angles;
        self
    }

    /// Whether a world-frame angle falls inside one of the blind spots.
    pub fn is_dead(&self, world_angle: f64) -> bool {
        let relative = wrap_to_tau(world_angle - self.heading);
        self.dead_angles.iter().any(|range| range.contains(relative))
    }

    /// Moves the robot by a world-frame offset and turns it.
    pub fn nudge(&mut self, dx: f64, dy: f64, dheading: f64) {
        self.position.x += dx;
        self.position.y += dy;
        self.heading += dheading;
    }
}

// =========================================================================
// == Arena Snapshot ==
// =========================================================================

/// A complete, read-only description of the scene for one scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Half the side length; the arena spans `[-half_size, half_size]` on both axes.
    pub half_size: f64,
    pub robot: RobotPose,
    pub rocks: Vec<Rock>,
}

impl Arena {
    pub fn new(side_size: f64, robot: RobotPose, rocks: Vec<Rock>) -> Result<Self, ArenaError> {
        if !side_size.is_finite() || side_size <= 0.0 {
            return Err(ArenaError::InvalidArenaSize(side_size / 2.0));
        }
        if let Some(bad) = rocks
            .iter()
            .find(|rock| !rock.diameter.is_finite() || rock.diameter < 0.0)
        {
            return Err(ArenaError::InvalidRockDiameter(bad.diameter));
        }
        Ok(Self {
            half_size: side_size / 2.0,
            robot,
            rocks,
        })
    }

    /// Scatters `count` rocks uniformly over the arena. A `diameter` of zero
    /// draws each rock's diameter uniformly from `[0, 1)`.
    pub fn random<R: Rng>(
        side_size: f64,
        count: usize,
        diameter: f64,
        robot: RobotPose,
        rng: &mut R,
    ) -> Result<Self, ArenaError> {
        if !side_size.is_finite() || side_size <= 0.0 {
            return Err(ArenaError::InvalidArenaSize(side_size / 2.0));
        }
        if !diameter.is_finite() || diameter < 0.0 {
            return Err(ArenaError::InvalidRockDiameter(diameter));
        }
        let half = side_size / 2.0;
        let rocks = (0..count)
            .map(|_| {
                let center = Point::new(rng.gen_range(-half..=half), rng.gen_range(-half..=half));
                let diameter = if diameter > 0.0 {
                    diameter
                } else {
                    rng.gen::<f64>()
                };
                Rock::new(center, diameter)
            })
            .collect();
        Self::new(side_size, robot, rocks)
    }

    pub fn side_size(&self) -> f64 {
        self.half_size * 2.0
    }

    /// Whether a point lies within the arena walls (walls inclusive).
    pub fn in_bounds(&self, point: &Point) -> bool {
        point.x.abs() <= self.half_size && point.y.abs() <= self.half_size
    }

    /// The first rock (in placement order) that contains the point.
    pub fn rock_at(&self, point: &Point) -> Option<&Rock> {
        self.rocks.iter().find(|rock| rock.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::{FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, PI};

    #[test]
    fn rock_contains_its_center() {
        let rock = Rock::new(Point::new(3.0, -1.0), 0.2);
        assert!(rock.contains(&Point::new(3.0, -1.0)));
    }

    #[test]
    fn rock_rim_is_outside() {
        let rock = Rock::new(Point::new(0.0, 0.0), 2.0);
        assert!(!rock.contains(&Point::new(1.0, 0.0)));
        assert!(rock.contains(&Point::new(0.999, 0.0)));
    }

    #[test]
    fn zero_diameter_rock_contains_nothing() {
        let rock = Rock::new(Point::new(0.0, 0.0), 0.0);
        assert!(!rock.contains(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn dead_range_between_bounds() {
        let robot = RobotPose::new(Point::origin(), 0.0)
            .with_dead_angles(vec![DeadAngleRange::new(FRAC_PI_6, FRAC_PI_3).unwrap()]);
        assert!(robot.is_dead(FRAC_PI_4));
        assert!(robot.is_dead(FRAC_PI_6));
        assert!(robot.is_dead(FRAC_PI_3));
        assert!(!robot.is_dead(0.0));
        assert!(!robot.is_dead(PI));
    }

    #[test]
    fn dead_range_follows_heading() {
        let robot = RobotPose::new(Point::origin(), PI)
            .with_dead_angles(vec![DeadAngleRange::new(FRAC_PI_6, FRAC_PI_3).unwrap()]);
        assert!(robot.is_dead(PI + FRAC_PI_4));
        assert!(!robot.is_dead(FRAC_PI_4));
        // Angles beyond 2π wrap around.
        assert!(robot.is_dead(PI + FRAC_PI_4 + 4.0 * PI));
    }

    #[test]
    fn dead_range_straddling_zero() {
        let robot = RobotPose::new(Point::origin(), 0.0)
            .with_dead_angles(vec![DeadAngleRange::new(-0.2, 0.2).unwrap()]);
        assert!(robot.is_dead(0.0));
        assert!(robot.is_dead(-0.1));
        assert!(robot.is_dead(0.1));
        assert!(!robot.is_dead(0.5));
    }

    #[test]
    fn inverted_dead_range_is_rejected() {
        assert!(matches!(
            DeadAngleRange::new(1.0, 0.5),
            Err(ArenaError::InvalidDeadAngle { .. })
        ));
    }

    #[test]
    fn arena_rejects_bad_sizes() {
        let robot = RobotPose::default();
        assert!(Arena::new(0.0, robot.clone(), vec![]).is_err());
        assert!(Arena::new(12.0, robot, vec![Rock::new(Point::origin(), -1.0)]).is_err());
    }

    #[test]
    fn random_arena_places_rocks_inside() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let arena = Arena::random(12.0, 25, 0.0, RobotPose::default(), &mut rng).unwrap();
        assert_eq!(arena.rocks.len(), 25);
        for rock in &arena.rocks {
            assert!(arena.in_bounds(&rock.center));
            assert!((0.0..1.0).contains(&rock.diameter));
        }
    }

    #[test]
    fn random_arena_rejects_bad_fixed_diameter() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            Arena::random(12.0, 3, -0.5, RobotPose::default(), &mut rng),
            Err(ArenaError::InvalidRockDiameter(-0.5))
        );
        assert!(matches!(
            Arena::random(12.0, 3, f64::NAN, RobotPose::default(), &mut rng),
            Err(ArenaError::InvalidRockDiameter(d)) if d.is_nan()
        ));
    }

    #[test]
    fn nudge_moves_and_turns() {
        let mut robot = RobotPose::default();
        robot.nudge(0.1, -0.1, 0.1);
        assert_eq!(robot.position, Point::new(0.1, -0.1));
        assert_eq!(robot.heading, 0.1);
    }
}
