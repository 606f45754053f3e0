//! Error types for dialctl

use dialflow_engine::{ConfigError, EngineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to open device VID=0x{vid:04X} PID=0x{pid:04X}: {reason}")]
    DeviceOpen { vid: u16, pid: u16, reason: String },

    #[error("Invalid report '{0}': expected hex bytes such as \"00 0a ff\"")]
    InvalidReport(String),

    #[error("Invalid capture file: {0}")]
    InvalidCapture(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceOpen { .. } => 2,
            CliError::InvalidReport(_) | CliError::InvalidCapture(_) | CliError::Json(_) => 4,
            CliError::Config(_) => 3,
            CliError::Engine(_) | CliError::Io(_) => 1,
        }
    }
}
