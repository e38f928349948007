//! Core error types for sipwell-core.
//!
//! This module defines the error hierarchy using thiserror. Nothing in here
//! is fatal to the coordinator: request handlers log failures and move on,
//! since the host environment respawns the coordinator on demand.

use chrono::NaiveTime;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sipwell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// State store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors (app configuration)
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialize errors (app configuration)
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Alert or audio delivery was rejected by the platform primitive
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// State-store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing file
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Failed to read a record
    #[error("Failed to read record '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Failed to write a record
    #[error("Failed to write record '{key}': {message}")]
    WriteFailed { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value for a settings field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// Active window with end before start (no overnight wraparound)
    #[error("Invalid active window: end_time ({end}) must be greater than start_time ({start})")]
    InvalidWindow { start: NaiveTime, end: NaiveTime },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
