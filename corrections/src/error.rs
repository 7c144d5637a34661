use crate::types::Outcome;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for correction operations
pub type Result<T> = std::result::Result<T, CorrectionsError>;

/// Error types for loading, configuring and submitting corrections
#[derive(Debug, Error)]
pub enum CorrectionsError {
    #[error("unable to read corrections file {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse corrections file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("unable to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// `index` is the zero-based position of the failing correction
    #[error("batch aborted at correction #{} ({label}): {outcome}", .index + 1)]
    Aborted {
        index: usize,
        label: String,
        outcome: Outcome,
    },

    #[error("batch cancelled before correction #{}", .index + 1)]
    Cancelled { index: usize },
}

impl CorrectionsError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The outcome that aborted the batch, if this error came from a submission
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Self::Aborted { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
