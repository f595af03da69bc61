//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid elevator config: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A layered source could not be combined with the others.
    #[error("configuration sources conflict: {0}")]
    Merge(String),

    /// Parsed fine, but describes a run that cannot exist.
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("no home directory to look for user config in: {0}")]
    Xdg(String),
}
