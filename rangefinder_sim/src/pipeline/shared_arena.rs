// rangefinder_sim/src/pipeline/shared_arena.rs

use parking_lot::Mutex;
use rangefinder_core::arena::{Arena, RobotPose};
use std::sync::Arc;

/// The single authoritative arena. Input handling mutates it; the scan
/// coordinator copies it once at the start of every cycle, so a cycle never
/// sees a half-applied update.
#[derive(Debug, Clone)]
pub struct SharedArena {
    inner: Arc<Mutex<Arena>>,
}

impl SharedArena {
    pub fn new(arena: Arena) -> Self {
        Self {
            inner: Arc::new(Mutex::new(arena)),
        }
    }

    pub fn snapshot(&self) -> Arena {
        self.inner.lock().clone()
    }

    pub fn set_pose(&self, robot: RobotPose) {
        self.inner.lock().robot = robot;
    }

    /// Moves and turns the robot relative to its current pose.
    pub fn nudge(&self, dx: f64, dy: f64, dheading: f64) {
        self.inner.lock().robot.nudge(dx, dy, dheading);
        tracing::debug!(dx, dy, dheading, "robot nudged");
    }

    pub fn replace(&self, arena: Arena) {
        *self.inner.lock() = arena;
    }
}
