// rangefinder_sim/src/config/mod.rs

//! Loads and validates scenario configuration.
//!
//! Built-in defaults are serialized into a base layer, the scenario file is
//! merged over it, and command-line overrides are merged last.

mod serde_helpers;
pub mod structs;

use crate::error::{Result, SimError};
use crate::pipeline::scan::ScanSettings;
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use rand::Rng;
use rangefinder_core::arena::{Arena, Rock, RobotPose};
use std::path::Path;
use std::time::Duration;

pub use structs::{ArenaConfig, RobotConfig, RockConfig, ScanConfig, ScenarioConfig, Simulation};

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub seed: Option<u64>,
}

/// Resolves the scenario: defaults, then the file (if any), then overrides.
pub fn load_scenario(path: Option<&Path>, overrides: ConfigOverrides) -> Result<ScenarioConfig> {
    let mut figment = Figment::from(Serialized::defaults(ScenarioConfig::default()));

    if let Some(path) = path {
        // A missing file would otherwise be skipped silently.
        if !path.is_file() {
            return Err(SimError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("scenario file not found: {}", path.display()),
            )));
        }
        tracing::info!("Loading scenario from: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }

    scenario_from_figment(figment, overrides)
}

/// Same as [`load_scenario`] but reads the scenario from a string.
pub fn scenario_from_str(toml: &str, overrides: ConfigOverrides) -> Result<ScenarioConfig> {
    let figment =
        Figment::from(Serialized::defaults(ScenarioConfig::default())).merge(Toml::string(toml));
    scenario_from_figment(figment, overrides)
}

fn scenario_from_figment(mut figment: Figment, overrides: ConfigOverrides) -> Result<ScenarioConfig> {
    if let Some(workers) = overrides.workers {
        figment = figment.merge(Serialized::default("scan.workers", workers));
    }
    if let Some(seed) = overrides.seed {
        figment = figment.merge(Serialized::default("simulation.seed", seed));
    }

    let config: ScenarioConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

impl ScenarioConfig {
    /// Structural checks that must pass before any thread is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.scan.workers == 0 {
            return Err(SimError::NoScanWorkers);
        }
        if self.scan.point_count < self.scan.workers {
            return Err(SimError::NoScanPoints {
                points: self.scan.point_count,
                workers: self.scan.workers,
            });
        }
        let side = self.arena.side_size;
        if !side.is_finite() || side <= 0.0 {
            return Err(rangefinder_core::error::ArenaError::InvalidArenaSize(side / 2.0).into());
        }
        let step = self.step_size();
        if !step.is_finite() || step <= 0.0 {
            return Err(rangefinder_core::error::SweepError::InvalidStepSize(step).into());
        }
        self.noise.validate()?;
        self.classifier.validate()?;
        Ok(())
    }

    /// Fine marching step, defaulting to a thousandth of the arena side.
    pub fn step_size(&self) -> f64 {
        self.scan
            .step_size
            .unwrap_or(self.arena.side_size / 1000.0)
    }

    /// Builds the initial arena. Explicit rocks win over random placement.
    pub fn build_arena<R: Rng>(&self, rng: &mut R) -> Result<Arena> {
        let robot = RobotPose::new(self.arena.robot.position, self.arena.robot.heading)
            .with_dead_angles(self.arena.robot.dead_angles.clone());

        let arena = if self.arena.rocks.is_empty() {
            Arena::random(
                self.arena.side_size,
                self.arena.rock_count,
                self.arena.rock_diameter,
                robot,
                rng,
            )?
        } else {
            let rocks = self
                .arena
                .rocks
                .iter()
                .map(|r| Rock::new(r.center, r.diameter))
                .collect();
            Arena::new(self.arena.side_size, robot, rocks)?
        };
        Ok(arena)
    }

    pub fn scan_settings(&self, master_seed: u64) -> ScanSettings {
        ScanSettings {
            workers: self.scan.workers,
            point_count: self.scan.point_count,
            step_size: self.step_size(),
            noise: self.noise,
            worker_timeout: self.scan.worker_timeout_ms.map(Duration::from_millis),
            master_seed,
        }
    }

    /// The fully resolved configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rangefinder_core::classify::StrategyKind;

    #[test]
    fn empty_scenario_uses_defaults() {
        let config = scenario_from_str("", ConfigOverrides::default()).unwrap();
        assert_eq!(config, ScenarioConfig::default());
        assert_eq!(config.scan.workers, 1);
        assert_eq!(config.scan.point_count, 800);
        assert_eq!(config.arena.side_size, 12.0);
        assert_eq!(config.step_size(), 0.012);
        assert_eq!(config.classifier.strategy, StrategyKind::HullBorder);
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let toml = r#"
            [simulation]
            seed = 7

            [scan]
            workers = 4

            [classifier]
            strategy = "cluster_regression"

            [arena.robot]
            position = [1.0, -2.0]
            dead_angles = [[0.5, 1.0]]

            [[arena.rocks]]
            center = [3.0, 0.0]
            diameter = 1.0
        "#;
        let config = scenario_from_str(toml, ConfigOverrides::default()).unwrap();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.scan.workers, 4);
        assert_eq!(config.scan.point_count, 800);
        assert_eq!(config.classifier.strategy, StrategyKind::ClusterRegression);
        assert_eq!(config.classifier.border_threshold, 0.15);
        assert_eq!(config.arena.robot.position.y, -2.0);
        assert_eq!(config.arena.robot.dead_angles.len(), 1);
        assert_eq!(config.arena.rocks.len(), 1);
    }

    #[test]
    fn overrides_win_over_the_file() {
        let overrides = ConfigOverrides {
            workers: Some(6),
            seed: Some(99),
        };
        let config = scenario_from_str("[scan]\nworkers = 2\n", overrides).unwrap();
        assert_eq!(config.scan.workers, 6);
        assert_eq!(config.simulation.seed, Some(99));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = scenario_from_str("[scan]\nthreads = 2\n", ConfigOverrides::default());
        assert!(matches!(err, Err(SimError::Config(_))));
    }

    #[test]
    fn structural_errors_surface_at_load() {
        assert!(matches!(
            scenario_from_str("[scan]\nworkers = 0\n", ConfigOverrides::default()),
            Err(SimError::NoScanWorkers)
        ));
        assert!(matches!(
            scenario_from_str("[scan]\nworkers = 8\npoint_count = 4\n", ConfigOverrides::default()),
            Err(SimError::NoScanPoints { points: 4, workers: 8 })
        ));
        assert!(matches!(
            scenario_from_str("[noise]\nglitch_rate = 2.0\n", ConfigOverrides::default()),
            Err(SimError::Sweep(_))
        ));
        assert!(matches!(
            scenario_from_str("[classifier]\nwindow_fraction = 1.5\n", ConfigOverrides::default()),
            Err(SimError::Classifier(_))
        ));
    }

    #[test]
    fn inverted_dead_angle_is_a_config_error() {
        let toml = "[arena.robot]\ndead_angles = [[1.0, 0.5]]\n";
        assert!(matches!(
            scenario_from_str(toml, ConfigOverrides::default()),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn missing_scenario_file_is_an_io_error() {
        let result = load_scenario(
            Some(Path::new("does/not/exist.toml")),
            ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(SimError::Io(_))));
    }

    #[test]
    fn explicit_rocks_replace_random_ones() {
        let toml = "[[arena.rocks]]\ncenter = [3.0, 0.0]\ndiameter = 1.0\n";
        let config = scenario_from_str(toml, ConfigOverrides::default()).unwrap();
        let arena = config.build_arena(&mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(arena.rocks.len(), 1);
        assert_eq!(arena.half_size, 6.0);

        let random = ScenarioConfig::default()
            .build_arena(&mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(random.rocks.len(), 5);
    }

    #[test]
    fn resolved_config_renders_as_toml() {
        let text = ScenarioConfig::default().to_toml().unwrap();
        let back = scenario_from_str(&text, ConfigOverrides::default()).unwrap();
        assert_eq!(back, ScenarioConfig::default());
    }
}
