//! Spooler error types

use std::path::PathBuf;
use thiserror::Error;

/// Spooler-specific errors
///
/// Only construction and teardown are fallible; background buffering and
/// rotation anomalies are logged and counted, never returned.
#[derive(Debug, Error)]
pub enum SpoolerError {
    /// Rejected configuration value
    #[error("invalid configuration at '{field}': {message}")]
    Config { field: String, message: String },

    /// Spool directory could not be created
    #[error("failed to create spool directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::SpoolError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpoolerError {
    /// Create a configuration error
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a directory-creation error
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}
