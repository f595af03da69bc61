//! Configuration loader with multi-source merging

use crate::{ConfigError, ElevatorConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader rooted at the current directory
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "ELEVATOR".to_string(),
            user_config: true,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the environment variable prefix (default: "ELEVATOR")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Skip ~/.config/elevator/config.toml.
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<ElevatorConfig> {
        let mut builder = config::Config::builder();

        // 1. Built-in defaults
        let defaults = ElevatorConfig::default();
        builder = builder.add_source(
            config::Config::try_from(&defaults).context("Failed to encode default configuration")?,
        );

        // 2. User config (~/.config/elevator/config.toml)
        if self.user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                if user_config_file.exists() {
                    builder = builder.add_source(toml_file(user_config_file));
                }
            }
        }

        // 3. Project config (elevator.toml)
        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(toml_file(project_config_file));
        }

        // 4. Local config (elevator.local.toml)
        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(toml_file(local_config_file));
        }

        // 5. Environment variables (ELEVATOR_SCHEDULER__POLICY=sstf)
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Merge(e.to_string()))
            .context("Failed to build configuration")?;

        let elevator_config: ElevatorConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        elevator_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(elevator_config)
    }

    /// Load configuration or return defaults if anything goes wrong
    pub fn load_or_default(self) -> ElevatorConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_file(path: PathBuf) -> impl config::Source + Send + Sync + 'static {
    config::File::from(path)
        .required(false)
        .format(config::FileFormat::Toml)
}
