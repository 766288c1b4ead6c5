// rangefinder_core/src/messages.rs

use crate::geometry::{Point, PolarCoord};
use crate::raycast::SweepOutput;
use std::time::Duration;

// =========================================================================
// == Scan Data ==
// =========================================================================

/// The aggregated output of one full scan cycle.
///
/// `absolute` and `relative` are index-aligned. Points are ordered by band
/// and, within a band, by ascending angle, so the frame as a whole is sorted
/// by angle whenever the bands ascend and cover the circle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFrame {
    /// Monotonic cycle counter assigned by the producer.
    pub cycle: u64,
    /// World-frame points.
    pub absolute: Vec<Point>,
    /// The same returns as (range, bearing) from the robot's heading.
    pub relative: Vec<PolarCoord>,
    /// Wall-clock time spent producing this frame.
    pub frame_time: Duration,
}

impl ScanFrame {
    pub fn from_sweep(cycle: u64, sweep: SweepOutput, frame_time: Duration) -> Self {
        Self {
            cycle,
            absolute: sweep.absolute,
            relative: sweep.relative,
            frame_time,
        }
    }

    /// Builds a frame from raw (range, bearing) samples, as delivered by a
    /// physical sensor. There is no world-frame counterpart for those, so
    /// `absolute` stays empty.
    pub fn from_samples(cycle: u64, relative: Vec<PolarCoord>) -> Self {
        Self {
            cycle,
            absolute: Vec::new(),
            relative,
            frame_time: Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.relative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relative.is_empty()
    }

    /// Robot-frame returns in Cartesian form, the input every classifier takes.
    pub fn robot_points(&self) -> Vec<Point> {
        self.relative.iter().map(|p| p.to_point()).collect()
    }
}
