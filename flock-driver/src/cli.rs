use std::path::PathBuf;

use clap::Parser;
use flock_shared::{ModelKind, SimulationSettings};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Headless flocking simulation driver", long_about = None)]
pub struct Args {
    /// JSON settings file; missing fields fall back to defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of agents (overrides the settings file)
    #[arg(short = 'n', long)]
    pub agents: Option<usize>,

    /// Number of ticks to simulate
    #[arg(short, long)]
    pub steps: Option<u64>,

    /// Tick duration in seconds
    #[arg(long)]
    pub dt: Option<f32>,

    /// Seed for the random source; omit for a fresh seed every run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Acceleration model: 'force_clamped' or 'mass_damper'
    #[arg(short, long)]
    pub model: Option<ModelKind>,

    /// Write one JSON frame per tick to this path, or '-' for stdout
    #[arg(short, long)]
    pub frames: Option<PathBuf>,

    /// Pace ticks to wall-clock time instead of running flat out
    #[arg(short, long)]
    pub realtime: bool,

    /// Log a flock summary every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    pub log_every: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    /// Applies command-line overrides on top of file settings.
    pub fn apply(&self, settings: &mut SimulationSettings) {
        if let Some(agents) = self.agents {
            settings.population = agents;
        }
        if let Some(steps) = self.steps {
            settings.steps = steps;
        }
        if let Some(dt) = self.dt {
            settings.dt = dt;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(model) = self.model {
            settings.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["flock-driver"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.realtime);
        assert_eq!(args.log_every, 100);

        let mut settings = SimulationSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings, SimulationSettings::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "flock-driver",
            "-n",
            "42",
            "--steps",
            "7",
            "--dt",
            "0.02",
            "--seed",
            "5",
            "--model",
            "mass_damper",
        ])
        .unwrap();

        let mut settings = SimulationSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.population, 42);
        assert_eq!(settings.steps, 7);
        assert_eq!(settings.dt, 0.02);
        assert_eq!(settings.seed, Some(5));
        assert_eq!(settings.model, ModelKind::MassDamper);
    }

    #[test]
    fn test_bad_model_is_rejected() {
        assert!(Args::try_parse_from(["flock-driver", "--model", "rk4"]).is_err());
    }
}
