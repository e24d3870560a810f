//! Solver configuration.
use std::fmt::Write;

use serde::Deserialize;
use thiserror::Error;

/// Errors for configuration values outside of their valid range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{} must be between 0 and 1, got {}", option, value)]
    NotAProbability { option: &'static str, value: f64 },
    #[error("{} must be a finite non-negative number, got {}", option, value)]
    Negative { option: &'static str, value: f64 },
    #[error("{} must be at least 1", option)]
    Zero { option: &'static str },
}

/// Configurable parameters used during solving.
///
/// `max_iterations` and `convergence_threshold` are the search budget. The defaults are only used
/// by the command line tool; library callers usually set both explicitly through
/// [`SolverConfig::new`], which also makes the threshold halt the search right away.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of search iterations. (Default: 100000)
    pub max_iterations: u64,

    /// Minimum improvement of the best score for an iteration to count as progress. (Default:
    /// 0.0001)
    pub convergence_threshold: f64,

    /// Number of consecutive iterations without progress after which the search halts. (Default:
    /// 10000)
    pub stall_patience: u64,

    /// Probability of making a random instead of a greedy move. (Default: 0.2)
    pub noise: f64,

    /// Seed of the random number generator. (Default: 0)
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            max_iterations: 100_000,
            convergence_threshold: 0.0001,
            stall_patience: 10_000,
            noise: 0.2,
            seed: 0,
        }
    }
}

/// Name, description and default of every option, used for [`SolverConfig::help`].
const OPTION_DOCS: &[(&str, &str)] = &[
    ("max_iterations", "Maximum number of search iterations."),
    (
        "convergence_threshold",
        "Minimum improvement of the best score for an iteration to count as progress.",
    ),
    (
        "stall_patience",
        "Number of consecutive iterations without progress after which the search halts.",
    ),
    (
        "noise",
        "Probability of making a random instead of a greedy move.",
    ),
    ("seed", "Seed of the random number generator."),
];

impl SolverConfig {
    /// Create a configuration with the given search budget.
    ///
    /// The search halts on the first iteration that improves the score by less than
    /// `convergence_threshold`, so `stall_patience` is 1. The remaining values are the defaults.
    pub fn new(max_iterations: u64, convergence_threshold: f64) -> SolverConfig {
        SolverConfig {
            max_iterations,
            convergence_threshold,
            stall_patience: 1,
            ..SolverConfig::default()
        }
    }

    /// Help text listing all options and their defaults.
    pub fn help() -> String {
        let defaults = SolverConfig::default();
        let mut help = String::new();
        for &(name, description) in OPTION_DOCS {
            let default = match name {
                "max_iterations" => defaults.max_iterations.to_string(),
                "convergence_threshold" => defaults.convergence_threshold.to_string(),
                "stall_patience" => defaults.stall_patience.to_string(),
                "noise" => defaults.noise.to_string(),
                _ => defaults.seed.to_string(),
            };
            let _ = writeln!(help, "{} = {}", name, default);
            let _ = writeln!(help, "    {}", description);
        }
        help
    }

    /// Check that all values are within their valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.noise) {
            return Err(ConfigError::NotAProbability {
                option: "noise",
                value: self.noise,
            });
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
            return Err(ConfigError::Negative {
                option: "convergence_threshold",
                value: self.convergence_threshold,
            });
        }
        if self.stall_patience == 0 {
            return Err(ConfigError::Zero {
                option: "stall_patience",
            });
        }
        Ok(())
    }
}

/// Partial update of a [`SolverConfig`].
///
/// Deserialized from TOML configuration files and `-C option=value` command line arguments.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub max_iterations: Option<u64>,
    pub convergence_threshold: Option<f64>,
    pub stall_patience: Option<u64>,
    pub noise: Option<f64>,
    pub seed: Option<u64>,
}

impl SolverConfigUpdate {
    /// Create an update that changes nothing.
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Combine two updates, values present in `other` take precedence.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        self.max_iterations = other.max_iterations.or(self.max_iterations);
        self.convergence_threshold = other.convergence_threshold.or(self.convergence_threshold);
        self.stall_patience = other.stall_patience.or(self.stall_patience);
        self.noise = other.noise.or(self.noise);
        self.seed = other.seed.or(self.seed);
    }

    /// Apply the update to a configuration.
    ///
    /// The configuration is left unchanged if the result would be invalid.
    pub fn apply(&self, config: &mut SolverConfig) -> Result<(), ConfigError> {
        let mut updated = config.clone();
        if let Some(value) = self.max_iterations {
            updated.max_iterations = value;
        }
        if let Some(value) = self.convergence_threshold {
            updated.convergence_threshold = value;
        }
        if let Some(value) = self.stall_patience {
            updated.stall_patience = value;
        }
        if let Some(value) = self.noise {
            updated.noise = value;
        }
        if let Some(value) = self.seed {
            updated.seed = value;
        }
        updated.validate()?;
        *config = updated;
        Ok(())
    }
}
