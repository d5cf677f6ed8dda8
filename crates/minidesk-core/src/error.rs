//! Core error types for minidesk-core.
//!
//! Widget operations never fail: invalid input is coerced or clamped and
//! rejected moves are reported through outcome values. The errors here cover
//! the ambient surface around the widgets (configuration files, parsing).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for minidesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for names and tokens coming from the presentation layer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown cost field: {0}")]
    UnknownField(String),

    #[error("unknown timer mode: {0}")]
    UnknownMode(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
