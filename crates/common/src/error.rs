//! Error types shared across evtape crates.

use std::path::PathBuf;

/// Top-level error type for evtape operations.
#[derive(Debug, thiserror::Error)]
pub enum EvtapeError {
    #[error("Registry error: {message}")]
    Registry { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Replay error: {message}")]
    Replay { message: String },

    #[error("Device error: {message}")]
    Device { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("record references source {index} but only {targets} replay targets exist")]
    SourceIndexOutOfRange { index: u8, targets: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EvtapeError.
pub type EvtapeResult<T> = Result<T, EvtapeError>;

impl EvtapeError {
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
