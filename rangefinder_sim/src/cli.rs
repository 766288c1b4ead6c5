// rangefinder_sim/src/cli.rs

use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Rangefinder: a rotating 2D lidar simulator with point-cloud classification.
///
/// This struct defines the command-line arguments accepted by the
/// `rangefinder_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run. Built-in defaults apply when omitted.
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    /// Stop after this many classified frames.
    #[arg(short, long)]
    pub frames: Option<u64>,

    /// Classify sweeps decoded from a captured sensor byte stream instead of simulating.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Override the number of casting workers.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Override the PRNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the resolved scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            workers: self.workers,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "rangefinder_sim",
            "--scenario",
            "assets/scenarios/default.toml",
            "--frames",
            "10",
            "-w",
            "4",
            "--seed",
            "3",
        ]);
        assert_eq!(cli.frames, Some(10));
        assert_eq!(cli.overrides().workers, Some(4));
        assert_eq!(cli.overrides().seed, Some(3));
        assert!(cli.replay.is_none());
        assert!(!cli.print_config);
    }
}
