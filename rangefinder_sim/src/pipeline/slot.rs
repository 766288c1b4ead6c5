// rangefinder_sim/src/pipeline/slot.rs

//! Single-value "latest wins" hand-off between pipeline stages.
//!
//! A producer replaces the whole value at once; consumers always see a
//! complete value, never a partially updated one. Nothing is queued: values
//! published while a consumer is busy are simply overwritten.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct SlotState<T> {
    /// Number of values published so far. `0` means empty.
    version: u64,
    value: Option<Arc<T>>,
    closed: bool,
}

pub struct LatestSlot<T> {
    state: Mutex<SlotState<T>>,
    changed: Condvar,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                version: 0,
                value: None,
                closed: false,
            }),
            changed: Condvar::new(),
        }
    }

    /// Replaces the current value and wakes every waiting consumer.
    /// Returns the new version.
    pub fn publish(&self, value: T) -> u64 {
        let mut state = self.state.lock();
        state.version += 1;
        state.value = Some(Arc::new(value));
        let version = state.version;
        drop(state);
        self.changed.notify_all();
        version
    }

    /// The current value and its version, if anything was published.
    pub fn latest(&self) -> Option<(u64, Arc<T>)> {
        let state = self.state.lock();
        state.value.as_ref().map(|v| (state.version, Arc::clone(v)))
    }

    pub fn version(&self) -> u64 {
        self.state.lock().version
    }

    /// Blocks until a value newer than `seen` is available, the slot is
    /// closed, or `timeout` elapses. Only the newest value is returned.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, Arc<T>)> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.version <= seen && !state.closed {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        if state.version > seen {
            state.value.as_ref().map(|v| (state.version, Arc::clone(v)))
        } else {
            None
        }
    }

    /// Wakes all waiters; later waits return immediately.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.changed.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
