//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the configuration boundary. The simulation itself is
/// total and never returns these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the simulation cannot use.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field path, e.g. `kart.max_speed`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid-field error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
