// rangefinder_sim/src/main.rs

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rangefinder_core::classify::{build_strategy, ClassificationStrategy};
use rangefinder_sim::cli::Cli;
use rangefinder_sim::config::{load_scenario, ScenarioConfig};
use rangefinder_sim::error::Result;
use rangefinder_sim::hardware::replay_frames;
use rangefinder_sim::pipeline::{classify_frame, ClassifiedFrame, ClassifierPipeline, ScanPipeline, SharedArena};
use rangefinder_sim::prng::resolve_seed;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rangefinder_sim=debug";

/// How long `main` waits for a classification before logging that it is
/// still waiting.
const RESULT_WAIT: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_scenario(cli.scenario.as_deref(), cli.overrides())?;
    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let strategy = build_strategy(&config.classifier);
    match &cli.replay {
        Some(path) => run_replay(path, strategy.as_ref(), cli.frames),
        None => run_simulation(&config, strategy, cli.frames),
    }
}

fn log_result(result: &ClassifiedFrame) {
    let c = &result.classification;
    tracing::info!(
        cycle = result.cycle,
        strategy = result.strategy,
        accepted = c.accepted.len(),
        rejected = c.rejected.len(),
        poi = c.points_of_interest.len(),
        elapsed = ?result.elapsed,
        "classified frame"
    );
}

fn run_simulation(
    config: &ScenarioConfig,
    strategy: Box<dyn ClassificationStrategy>,
    frames: Option<u64>,
) -> Result<()> {
    let seed = resolve_seed(config.simulation.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let arena = config.build_arena(&mut rng)?;
    tracing::info!(
        seed,
        side_size = arena.side_size(),
        rocks = arena.rocks.len(),
        workers = config.scan.workers,
        strategy = strategy.name(),
        "starting simulation"
    );
    for rock in &arena.rocks {
        tracing::debug!(x = rock.center.x, y = rock.center.y, diameter = rock.diameter, "rock");
    }

    let mut scan = ScanPipeline::start(&config.scan_settings(seed), SharedArena::new(arena))?;
    for (i, band) in scan.bands().iter().enumerate() {
        tracing::debug!(worker = i, start = band.start, end = band.end, "band assignment");
    }
    let mut classifier = ClassifierPipeline::start(strategy, scan.frames())?;
    let results = classifier.results();

    let mut seen = 0;
    let mut classified = 0u64;
    while frames.map_or(true, |limit| classified < limit) {
        match results.wait_newer(seen, RESULT_WAIT) {
            Some((version, result)) => {
                seen = version;
                classified += 1;
                log_result(&result);
            }
            None if results.is_closed() => {
                tracing::warn!("classifier stopped");
                break;
            }
            None => {
                tracing::debug!("still waiting for a classified frame");
            }
        }
    }

    classifier.shutdown();
    scan.shutdown();
    tracing::info!(classified, "simulation finished");
    Ok(())
}

fn run_replay(
    path: &Path,
    strategy: &dyn ClassificationStrategy,
    frames: Option<u64>,
) -> Result<()> {
    let limit = frames.unwrap_or(u64::MAX);
    let mut classified = 0u64;
    for frame in replay_frames(path)? {
        if classified >= limit {
            break;
        }
        let frame = frame?;
        log_result(&classify_frame(strategy, &frame));
        classified += 1;
    }
    tracing::info!(classified, "replay finished");
    Ok(())
}
