//! Configuration management for elevator
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (`ELEVATOR_*` prefix, `__` between section and key)
//! 3. elevator.local.toml (local overrides, not checked in)
//! 4. elevator.toml (project config)
//! 5. ~/.config/elevator/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [scheduler]
//! policy = "look"
//! sweep_end = "wrap"
//!
//! [simulation]
//! seed = 42
//! requests = 10000
//! pattern = "hotspot"
//!
//! [logging]
//! filter = "elevator=debug"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;

mod error;
mod loader;
mod paths;

pub use elevator_types::{SchedulerConfig, SeekPolicy, SweepEnd};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main elevator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorConfig {
    pub scheduler: SchedulerConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
}

/// Shape of the sector addresses a simulated workload touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadPattern {
    /// Start sectors drawn uniformly across the device.
    #[default]
    Uniform,
    /// Mostly back-to-back runs, like a streaming reader.
    Sequential,
    /// Most requests land in a narrow band of the device.
    Hotspot,
}

impl WorkloadPattern {
    pub const ALL: [WorkloadPattern; 3] = [
        WorkloadPattern::Uniform,
        WorkloadPattern::Sequential,
        WorkloadPattern::Hotspot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadPattern::Uniform => "uniform",
            WorkloadPattern::Sequential => "sequential",
            WorkloadPattern::Hotspot => "hotspot",
        }
    }
}

impl Display for WorkloadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::Invalid {
                field: "simulation.pattern",
                reason: format!("unknown workload pattern {s:?}"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Requests submitted over the whole run.
    pub requests: u64,
    /// Exclusive upper bound of the simulated device, in sectors.
    pub max_sector: u64,
    /// Longest request, in sectors.
    pub max_length: u64,
    pub pattern: WorkloadPattern,
    /// Chance that a request is generated to end exactly where a pending one starts.
    pub merge_probability: f64,
    /// Extents submitted per round; each round is followed by up to as many
    /// dispatches.
    pub dispatch_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            requests: 10_000,
            max_sector: 1 << 20,
            max_length: 256,
            pattern: WorkloadPattern::Uniform,
            merge_probability: 0.1,
            dispatch_every: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ElevatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Reads a single TOML file, bypassing the layered sources.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// A small, chatty run for poking at scheduler behaviour by hand.
    pub fn development() -> Self {
        Self {
            simulation: SimulationConfig {
                requests: 64,
                max_sector: 4096,
                max_length: 16,
                dispatch_every: 2,
                ..Default::default()
            },
            logging: LoggingConfig {
                filter: "elevator=trace,elevator_sim=debug".to_string(),
            },
            ..Default::default()
        }
    }

    /// Rejects values no run can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        if self.logging.filter.trim().is_empty() {
            return Err(invalid("logging.filter", "must not be empty"));
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests == 0 {
            return Err(invalid("simulation.requests", "must be at least 1"));
        }
        if self.max_sector == 0 {
            return Err(invalid("simulation.max_sector", "must be at least 1"));
        }
        if self.max_length == 0 {
            return Err(invalid(
                "simulation.max_length",
                "zero-length requests are not allowed",
            ));
        }
        if self.max_length > self.max_sector {
            return Err(invalid(
                "simulation.max_length",
                format!(
                    "{} exceeds the device size of {} sectors",
                    self.max_length, self.max_sector
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.merge_probability) {
            return Err(invalid(
                "simulation.merge_probability",
                format!("{} is not within [0, 1]", self.merge_probability),
            ));
        }
        if self.dispatch_every == 0 {
            return Err(invalid("simulation.dispatch_every", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
