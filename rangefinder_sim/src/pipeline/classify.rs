// rangefinder_sim/src/pipeline/classify.rs

use super::slot::LatestSlot;
use crate::error::{Result, SimError};
use rangefinder_core::classify::{Classification, ClassificationStrategy};
use rangefinder_core::messages::ScanFrame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How long the loop blocks on the frame slot before re-checking for shutdown.
const FRAME_WAIT: Duration = Duration::from_millis(50);

/// One classification result, published as a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedFrame {
    /// Cycle of the scan frame this result was computed from.
    pub cycle: u64,
    pub strategy: &'static str,
    pub classification: Classification,
    pub elapsed: Duration,
}

/// Classifies one frame in the robot frame, which is what both simulated and
/// hardware frames carry.
pub fn classify_frame(strategy: &dyn ClassificationStrategy, frame: &ScanFrame) -> ClassifiedFrame {
    let started = Instant::now();
    let classification = strategy.classify(&frame.robot_points());
    ClassifiedFrame {
        cycle: frame.cycle,
        strategy: strategy.name(),
        classification,
        elapsed: started.elapsed(),
    }
}

/// A background loop that always classifies the newest scan frame.
///
/// Frames that arrive while a classification is running are overwritten,
/// never queued.
pub struct ClassifierPipeline {
    running: Arc<AtomicBool>,
    results: Arc<LatestSlot<ClassifiedFrame>>,
    handle: Option<JoinHandle<()>>,
}

impl ClassifierPipeline {
    pub fn start(
        strategy: Box<dyn ClassificationStrategy>,
        frames: Arc<LatestSlot<ScanFrame>>,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let results = Arc::new(LatestSlot::new());

        let loop_running = Arc::clone(&running);
        let loop_results = Arc::clone(&results);
        let name = strategy.name();
        let handle = thread::Builder::new()
            .name("classifier".to_string())
            .spawn(move || classifier_loop(strategy, frames, loop_results, loop_running))
            .map_err(|source| SimError::WorkerSpawn {
                name: "classifier".to_string(),
                source,
            })?;

        tracing::info!(strategy = name, "classifier pipeline started");
        Ok(Self {
            running,
            results,
            handle: Some(handle),
        })
    }

    pub fn results(&self) -> Arc<LatestSlot<ClassifiedFrame>> {
        Arc::clone(&self.results)
    }

    pub fn latest(&self) -> Option<Arc<ClassifiedFrame>> {
        self.results.latest().map(|(_, result)| result)
    }

    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("classifier thread panicked");
            }
        }
        self.results.close();
    }
}

impl Drop for ClassifierPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn classifier_loop(
    strategy: Box<dyn ClassificationStrategy>,
    frames: Arc<LatestSlot<ScanFrame>>,
    results: Arc<LatestSlot<ClassifiedFrame>>,
    running: Arc<AtomicBool>,
) {
    let mut seen = 0;
    while running.load(Ordering::Relaxed) {
        let Some((version, frame)) = frames.wait_newer(seen, FRAME_WAIT) else {
            if frames.is_closed() {
                break;
            }
            continue;
        };
        if version > seen + 1 && seen > 0 {
            tracing::trace!(dropped = version - seen - 1, "classifier skipped frames");
        }
        seen = version;

        let result = classify_frame(strategy.as_ref(), &frame);
        tracing::trace!(
            cycle = result.cycle,
            accepted = result.classification.accepted.len(),
            rejected = result.classification.rejected.len(),
            poi = result.classification.points_of_interest.len(),
            elapsed = ?result.elapsed,
            "frame classified"
        );
        results.publish(result);
    }

    results.close();
    tracing::debug!("classifier loop exiting");
}
