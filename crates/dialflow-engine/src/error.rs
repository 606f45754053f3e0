//! Error types for the dial engine.

use dialflow_report::DecodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON or contains a malformed mapping key.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

/// Errors returned by [`DialEngine`](crate::DialEngine) operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A report could not be decoded. The decoder session has been reset.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A report arrived while no device session is open.
    #[error("No device session is open")]
    Disconnected,

    /// No wheel with this name has received an impulse.
    #[error("Unknown wheel: {0}")]
    UnknownWheel(String),

    /// A position passed to the emitter is NaN or infinite.
    #[error("Non-finite wheel position: {0}")]
    NonFinitePosition(f64),

    /// The report source failed.
    #[error("Report source error: {0}")]
    Source(String),
}

impl EngineError {
    /// Create an unknown wheel error.
    #[must_use]
    pub fn unknown_wheel(name: impl Into<String>) -> Self {
        Self::UnknownWheel(name.into())
    }

    /// Create a report source error.
    #[must_use]
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::Source(reason.into())
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
