// rangefinder_core/src/raycast.rs

//! Ray casting against an [`Arena`] snapshot.
//!
//! A ray marches out from the robot in coarse steps until it leaves the arena
//! or lands inside a rock. On entering a rock it backs out in fine steps, so
//! the reported point sits just outside the rim. Two kinds of sensor noise are
//! layered on top: a rare glitch that stops the ray early, and a small
//! positional jitter on every return.
//!
//! Everything here is a pure function of its arguments plus the caller's RNG,
//! so independent workers can sweep disjoint bands concurrently.

use crate::arena::Arena;
use crate::error::SweepError;
use crate::geometry::{direction, wrap_to_tau, Point, Polar, PolarCoord};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Ratio between the coarse marching step and the fine back-off step.
pub const COARSE_STEP_FACTOR: f64 = 10.0;

// =========================================================================
// == Parameters ==
// =========================================================================

/// Sensor noise model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NoiseConfig {
    /// Upper bound of the uniform offset added to each coordinate of a return.
    pub jitter: f64,
    /// Per-step probability that a ray stops where it is.
    pub glitch_rate: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            jitter: 0.05,
            glitch_rate: 1e-5,
        }
    }
}

impl NoiseConfig {
    /// No jitter and no glitches: casting becomes fully deterministic.
    pub fn disabled() -> Self {
        Self {
            jitter: 0.0,
            glitch_rate: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(SweepError::InvalidJitter(self.jitter));
        }
        if !(0.0..=1.0).contains(&self.glitch_rate) {
            return Err(SweepError::InvalidGlitchRate(self.glitch_rate));
        }
        Ok(())
    }
}

/// A half-open angular interval `[start, end)` in the world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub start: f64,
    pub end: f64,
}

impl Default for AngleBand {
    fn default() -> Self {
        Self::full_circle()
    }
}

impl AngleBand {
    pub fn new(start: f64, end: f64) -> Result<Self, SweepError> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(SweepError::InvalidAngleRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn full_circle() -> Self {
        Self {
            start: 0.0,
            end: TAU,
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, angle: f64) -> bool {
        self.start <= angle && angle < self.end
    }

    /// Splits `[0, 2π)` into `count` equal, contiguous bands in ascending order.
    /// Adjacent bands share their boundary value exactly.
    pub fn partition(count: usize) -> Vec<AngleBand> {
        let n = count as f64;
        (0..count)
            .map(|i| AngleBand {
                start: i as f64 / n * TAU,
                end: (i + 1) as f64 / n * TAU,
            })
            .collect()
    }

    /// The `index`-th of `count` evenly spaced sample angles in this band.
    pub fn sample_angle(&self, index: usize, count: usize) -> f64 {
        self.start + index as f64 / count as f64 * self.width()
    }
}

/// Everything a sweep needs besides the arena and an RNG.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepParams {
    pub point_count: usize,
    /// Fine step length. The coarse step is `COARSE_STEP_FACTOR` times this.
    pub step_size: f64,
    pub noise: NoiseConfig,
    pub band: AngleBand,
}

impl SweepParams {
    pub fn validate(&self) -> Result<(), SweepError> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(SweepError::InvalidStepSize(self.step_size));
        }
        self.noise.validate()?;
        AngleBand::new(self.band.start, self.band.end)?;
        Ok(())
    }
}

// =========================================================================
// == Results ==
// =========================================================================

/// One return in both frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayReturn {
    /// World-frame point.
    pub absolute: Point,
    /// Range and bearing from the robot, bearing measured from its heading
    /// and wrapped into `[0, 2π)`.
    pub relative: PolarCoord,
}

/// Output of one sweep. The two sequences are index-aligned and in
/// ascending angle order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutput {
    pub absolute: Vec<Point>,
    pub relative: Vec<PolarCoord>,
}

impl SweepOutput {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            absolute: Vec::with_capacity(capacity),
            relative: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.absolute.len()
    }

    pub fn is_empty(&self) -> bool {
        self.absolute.is_empty()
    }

    pub fn push(&mut self, ray: RayReturn) {
        self.absolute.push(ray.absolute);
        self.relative.push(ray.relative);
    }

    /// Appends another sweep, keeping both sequences aligned.
    pub fn extend(&mut self, other: SweepOutput) {
        self.absolute.extend(other.absolute);
        self.relative.extend(other.relative);
    }
}

// =========================================================================
// == Casting ==
// =========================================================================

/// Geometric resolution of a single ray, without jitter.
///
/// `glitch` is consulted once per coarse step that stays inside the arena;
/// when it fires, the ray stops at the current probe position.
fn trace<R: Rng>(
    arena: &Arena,
    angle: f64,
    step_size: f64,
    glitch: Option<&Bernoulli>,
    rng: &mut R,
) -> Point {
    let dir = direction(angle);
    let coarse = dir * (step_size * COARSE_STEP_FACTOR);
    let fine = dir * step_size;
    let half = arena.half_size;
    let inside = |p: &Point| p.x.abs() < half && p.y.abs() < half;

    let mut probe = arena.robot.position;
    while inside(&probe) {
        let last = probe;
        probe += coarse;

        if let Some(rock) = arena.rock_at(&probe) {
            while rock.contains(&probe) {
                probe -= fine;
            }
            return probe;
        }

        if !inside(&probe) {
            return wall_crossing(&last, &probe, half);
        }

        if let Some(glitch) = glitch {
            if glitch.sample(rng) {
                return probe;
            }
        }
    }

    // Started on or outside the wall.
    Point::new(probe.x.clamp(-half, half), probe.y.clamp(-half, half))
}

/// Where the step `from -> to` first meets the arena wall. The point stays on
/// the ray, so its bearing from the robot is the cast angle.
fn wall_crossing(from: &Point, to: &Point, half: f64) -> Point {
    let delta = to - from;
    let mut fraction = 1.0_f64;
    for axis in 0..2 {
        let (start, d) = (from[axis], delta[axis]);
        if d > 0.0 && start + d > half {
            fraction = fraction.min((half - start) / d);
        } else if d < 0.0 && start + d < -half {
            fraction = fraction.min((-half - start) / d);
        }
    }
    let hit = from + delta * fraction.max(0.0);
    Point::new(hit.x.clamp(-half, half), hit.y.clamp(-half, half))
}

/// Casts one ray and returns the (noisy) hit in world and robot frames.
pub fn cast_ray<R: Rng>(
    arena: &Arena,
    angle: f64,
    step_size: f64,
    noise: &NoiseConfig,
    rng: &mut R,
) -> Result<RayReturn, SweepError> {
    if !step_size.is_finite() || step_size <= 0.0 {
        return Err(SweepError::InvalidStepSize(step_size));
    }
    noise.validate()?;
    let glitch = glitch_distribution(noise)?;
    let jitter = jitter_distribution(noise);
    Ok(cast_prepared(
        arena,
        angle,
        step_size,
        glitch.as_ref(),
        jitter.as_ref(),
        rng,
    ))
}

fn glitch_distribution(noise: &NoiseConfig) -> Result<Option<Bernoulli>, SweepError> {
    if noise.glitch_rate <= 0.0 {
        return Ok(None);
    }
    Bernoulli::new(noise.glitch_rate)
        .map(Some)
        .map_err(|_| SweepError::InvalidGlitchRate(noise.glitch_rate))
}

fn jitter_distribution(noise: &NoiseConfig) -> Option<Uniform<f64>> {
    (noise.jitter > 0.0).then(|| Uniform::new(0.0, noise.jitter))
}

fn cast_prepared<R: Rng>(
    arena: &Arena,
    angle: f64,
    step_size: f64,
    glitch: Option<&Bernoulli>,
    jitter: Option<&Uniform<f64>>,
    rng: &mut R,
) -> RayReturn {
    let mut absolute = trace(arena, angle, step_size, glitch, rng);
    if let Some(jitter) = jitter {
        absolute.x += jitter.sample(rng);
        absolute.y += jitter.sample(rng);
    }

    let offset = Point::from(absolute - arena.robot.position);
    let polar = offset.to_polar();
    let relative = PolarCoord::new(polar.radius, wrap_to_tau(polar.angle - arena.robot.heading));

    RayReturn { absolute, relative }
}

/// Sweeps `params.point_count` evenly spaced angles across `params.band`,
/// skipping angles hidden by the robot's dead ranges.
pub fn scan_sweep<R: Rng>(
    arena: &Arena,
    params: &SweepParams,
    rng: &mut R,
) -> Result<SweepOutput, SweepError> {
    params.validate()?;
    let glitch = glitch_distribution(&params.noise)?;
    let jitter = jitter_distribution(&params.noise);

    let mut output = SweepOutput::with_capacity(params.point_count);
    for i in 0..params.point_count {
        let angle = params.band.sample_angle(i, params.point_count);
        if arena.robot.is_dead(angle) {
            continue;
        }
        output.push(cast_prepared(
            arena,
            angle,
            params.step_size,
            glitch.as_ref(),
            jitter.as_ref(),
            rng,
        ));
    }
    Ok(output)
}
