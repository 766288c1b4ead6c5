// rangefinder_sim/src/pipeline/scan.rs

//! The scan pipeline: a fixed pool of casting workers plus one coordinator.
//!
//! Each worker owns one angular band for the lifetime of the pipeline. Every
//! cycle the coordinator copies the shared arena, hands one job to every
//! worker over that worker's bounded job channel, then waits until every band
//! has reported on the shared result channel. Only then are the bands joined
//! (in band order) into a [`ScanFrame`] and published.

use super::shared_arena::SharedArena;
use super::slot::LatestSlot;
use crate::error::{Result, SimError};
use crate::prng::SimulationRng;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use rangefinder_core::arena::Arena;
use rangefinder_core::messages::ScanFrame;
use rangefinder_core::raycast::{scan_sweep, AngleBand, NoiseConfig, SweepOutput, SweepParams};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a coordinator with no timeout re-checks for shutdown while it
/// waits on a slow band.
const STALL_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Cycles between frame-time summaries in the log.
const STATS_EVERY: u64 = 100;

// =========================================================================
// == Settings ==
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub workers: usize,
    /// Rays per full revolution, split as evenly as possible across bands.
    pub point_count: usize,
    pub step_size: f64,
    pub noise: NoiseConfig,
    /// `None` waits for stalled workers indefinitely.
    pub worker_timeout: Option<Duration>,
    pub master_seed: u64,
}

impl ScanSettings {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(SimError::NoScanWorkers);
        }
        if self.point_count < self.workers {
            return Err(SimError::NoScanPoints {
                points: self.point_count,
                workers: self.workers,
            });
        }
        for params in self.band_params() {
            params.validate()?;
        }
        Ok(())
    }

    /// Sweep parameters for every band, in band order.
    pub fn band_params(&self) -> Vec<SweepParams> {
        let base = self.point_count / self.workers;
        let extra = self.point_count % self.workers;
        AngleBand::partition(self.workers)
            .into_iter()
            .enumerate()
            .map(|(i, band)| SweepParams {
                point_count: base + usize::from(i < extra),
                step_size: self.step_size,
                noise: self.noise,
                band,
            })
            .collect()
    }
}

// =========================================================================
// == Messages ==
// =========================================================================

struct Job {
    cycle: u64,
    arena: Arena,
}

struct BandResult {
    cycle: u64,
    worker: usize,
    outcome: std::result::Result<SweepOutput, String>,
}

// =========================================================================
// == Worker ==
// =========================================================================

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Sweeps one band of the given arena. A panic inside the sweep is caught and
/// reported as a failed band instead of taking the worker down.
fn sweep_band(
    arena: &Arena,
    params: &SweepParams,
    rng: &mut SimulationRng,
) -> std::result::Result<SweepOutput, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| scan_sweep(arena, params, &mut rng.0))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn worker_loop(
    index: usize,
    params: SweepParams,
    mut rng: SimulationRng,
    jobs: Receiver<Job>,
    results: Sender<BandResult>,
    running: Arc<AtomicBool>,
) {
    tracing::debug!(
        worker = index,
        start = params.band.start,
        end = params.band.end,
        points = params.point_count,
        "casting worker started"
    );

    for job in jobs.iter() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        let outcome = sweep_band(&job.arena, &params, &mut rng);
        let result = BandResult {
            cycle: job.cycle,
            worker: index,
            outcome,
        };
        if results.send(result).is_err() {
            break;
        }
    }

    tracing::debug!(worker = index, "casting worker exiting");
}

// =========================================================================
// == Coordinator ==
// =========================================================================

/// Drives one scan cycle at a time. Owned by the coordinator thread, but
/// usable directly for synchronous stepping.
pub struct ScanCoordinator {
    arena: SharedArena,
    job_senders: Vec<Sender<Job>>,
    results: Receiver<BandResult>,
    timeout: Option<Duration>,
    running: Arc<AtomicBool>,
}

impl ScanCoordinator {
    fn dispatch(&self, cycle: u64, arena: &Arena) -> Result<()> {
        for (worker, tx) in self.job_senders.iter().enumerate() {
            let job = Job {
                cycle,
                arena: arena.clone(),
            };
            match self.timeout {
                Some(timeout) => match tx.send_timeout(job, timeout) {
                    Ok(()) => {}
                    Err(SendTimeoutError::Timeout(_)) => {
                        return Err(SimError::WorkerStalled {
                            cycle,
                            missing: vec![worker],
                        })
                    }
                    Err(SendTimeoutError::Disconnected(_)) => {
                        return Err(SimError::PipelineDisconnected)
                    }
                },
                None => tx.send(job).map_err(|_| SimError::PipelineDisconnected)?,
            }
        }
        Ok(())
    }

    /// Runs one full cycle: snapshot, dispatch, join, concatenate.
    pub fn run_cycle(&self, cycle: u64) -> Result<ScanFrame> {
        let arena = self.arena.snapshot();
        let started = Instant::now();
        self.dispatch(cycle, &arena)?;

        let workers = self.job_senders.len();
        let mut bands: Vec<Option<SweepOutput>> = (0..workers).map(|_| None).collect();
        let mut pending = workers;
        let deadline = self.timeout.map(|t| started + t);

        while pending > 0 {
            let wait = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => STALL_CHECK_INTERVAL,
            };
            let message = match self.results.recv_timeout(wait) {
                Ok(message) => message,
                Err(RecvTimeoutError::Disconnected) => return Err(SimError::PipelineDisconnected),
                Err(RecvTimeoutError::Timeout) => {
                    let missing: Vec<usize> = (0..workers).filter(|&i| bands[i].is_none()).collect();
                    if deadline.is_some() {
                        return Err(SimError::WorkerStalled { cycle, missing });
                    }
                    if !self.running.load(Ordering::Relaxed) {
                        return Err(SimError::PipelineDisconnected);
                    }
                    tracing::warn!(cycle, ?missing, "scan cycle stalled, still waiting");
                    continue;
                }
            };

            // Late answers to an abandoned cycle.
            if message.cycle != cycle {
                tracing::trace!(worker = message.worker, stale = message.cycle, "dropping stale band");
                continue;
            }
            let band = match message.outcome {
                Ok(output) => output,
                Err(reason) => {
                    tracing::warn!(cycle, worker = message.worker, %reason, "band failed, leaving it empty");
                    SweepOutput::default()
                }
            };
            if bands[message.worker].replace(band).is_none() {
                pending -= 1;
            }
        }

        let mut merged = SweepOutput::with_capacity(bands.iter().flatten().map(SweepOutput::len).sum());
        for band in bands.into_iter().flatten() {
            merged.extend(band);
        }
        let frame = ScanFrame::from_sweep(cycle, merged, started.elapsed());
        tracing::trace!(cycle, points = frame.len(), elapsed = ?frame.frame_time, "scan cycle complete");
        Ok(frame)
    }

    fn run(self, frames: Arc<LatestSlot<ScanFrame>>) {
        let mut cycle: u64 = 0;
        let mut total = Duration::ZERO;
        let mut timed = 0u64;

        while self.running.load(Ordering::Relaxed) {
            match self.run_cycle(cycle) {
                Ok(frame) => {
                    total += frame.frame_time;
                    timed += 1;
                    frames.publish(frame);
                    if timed == STATS_EVERY {
                        tracing::debug!(
                            cycle,
                            mean_frame_time = ?(total / timed as u32),
                            "scan frame time"
                        );
                        total = Duration::ZERO;
                        timed = 0;
                    }
                }
                Err(SimError::WorkerStalled { cycle, missing }) => {
                    tracing::error!(cycle, ?missing, "scan workers timed out, abandoning cycle");
                }
                Err(e) => {
                    if self.running.load(Ordering::Relaxed) {
                        tracing::error!(error = %e, "scan coordinator stopping");
                    }
                    break;
                }
            }
            cycle += 1;
        }

        frames.close();
        tracing::debug!("scan coordinator exiting");
    }
}

// =========================================================================
// == Pipeline ==
// =========================================================================

/// A running scan pipeline. Dropping it stops the coordinator; casting
/// workers exit once their job channel closes and are never joined.
pub struct ScanPipeline {
    running: Arc<AtomicBool>,
    frames: Arc<LatestSlot<ScanFrame>>,
    arena: SharedArena,
    bands: Vec<AngleBand>,
    coordinator: Option<JoinHandle<()>>,
}

impl ScanPipeline {
    /// Validates `settings`, spawns the workers and builds a coordinator
    /// without starting it.
    pub fn coordinator(settings: &ScanSettings, arena: SharedArena) -> Result<ScanCoordinator> {
        Self::build(settings, arena, Arc::new(AtomicBool::new(true)))
    }

    fn build(
        settings: &ScanSettings,
        arena: SharedArena,
        running: Arc<AtomicBool>,
    ) -> Result<ScanCoordinator> {
        settings.validate()?;

        let (result_tx, result_rx) = bounded(settings.workers);
        let mut job_senders = Vec::with_capacity(settings.workers);

        for (index, params) in settings.band_params().into_iter().enumerate() {
            let (job_tx, job_rx) = bounded(1);
            let results = result_tx.clone();
            let rng = SimulationRng::for_worker(settings.master_seed, index);
            let running = Arc::clone(&running);
            let name = format!("scan-worker-{index}");
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(index, params, rng, job_rx, results, running))
                .map_err(|source| SimError::WorkerSpawn { name, source })?;
            job_senders.push(job_tx);
        }

        Ok(ScanCoordinator {
            arena,
            job_senders,
            results: result_rx,
            timeout: settings.worker_timeout,
            running,
        })
    }

    /// Starts workers and the coordinator loop.
    pub fn start(settings: &ScanSettings, arena: SharedArena) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let coordinator = Self::build(settings, arena.clone(), Arc::clone(&running))?;
        let frames = Arc::new(LatestSlot::new());

        let slot = Arc::clone(&frames);
        let handle = thread::Builder::new()
            .name("scan-coordinator".to_string())
            .spawn(move || coordinator.run(slot))
            .map_err(|source| SimError::WorkerSpawn {
                name: "scan-coordinator".to_string(),
                source,
            })?;

        let bands = AngleBand::partition(settings.workers);
        tracing::info!(
            workers = settings.workers,
            points = settings.point_count,
            step_size = settings.step_size,
            timeout = ?settings.worker_timeout,
            "scan pipeline started"
        );

        Ok(Self {
            running,
            frames,
            arena,
            bands,
            coordinator: Some(handle),
        })
    }

    /// The slot the coordinator publishes frames into.
    pub fn frames(&self) -> Arc<LatestSlot<ScanFrame>> {
        Arc::clone(&self.frames)
    }

    pub fn latest_frame(&self) -> Option<Arc<ScanFrame>> {
        self.frames.latest().map(|(_, frame)| frame)
    }

    /// Handle for moving the robot between cycles.
    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    pub fn bands(&self) -> &[AngleBand] {
        &self.bands
    }

    /// Signals every thread to stop and waits for the coordinator.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.coordinator.take() {
            if handle.join().is_err() {
                tracing::error!("scan coordinator panicked");
            }
        }
        self.frames.close();
    }
}

impl Drop for ScanPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
