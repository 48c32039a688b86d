//! Error types shared across Gazemap crates.
//!
//! The aggregation core itself never fails; these errors only surface at
//! I/O boundaries (configuration files, sample files, snapshot sinks).

use std::path::PathBuf;

/// Top-level error type for Gazemap operations.
#[derive(Debug, thiserror::Error)]
pub enum GazemapError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Snapshot sink error: {message}")]
    Sink { message: String },

    #[error("Replay error: {message}")]
    Replay { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GazemapError.
pub type GazemapResult<T> = Result<T, GazemapError>;

impl GazemapError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }
}
