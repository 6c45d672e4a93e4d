// src/error.rs

//! Unified error handling for the listing core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
///
/// Only [`AppError::PathViolation`] is raised by the loader itself. A missing
/// or unreadable source file is reported as
/// [`LoadOutcome::Unavailable`](crate::storage::LoadOutcome) instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV reading failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request parameter validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resolved source path escapes the allowed base directory
    #[error("Path {path:?} escapes allowed directory {base:?}")]
    PathViolation { path: PathBuf, base: PathBuf },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a path violation error.
    pub fn path_violation(path: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self::PathViolation {
            path: path.into(),
            base: base.into(),
        }
    }

    /// Whether this error came from request validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
