//! Error types for OrderTrends

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using OrderTrends' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for OrderTrends operations
#[derive(Error, Debug)]
pub enum Error {
    /// A timestamp could not be normalized into an instant
    #[error("Cannot parse timestamp '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Trend defaults requested over an empty order set
    #[error("No orders available to infer a default date range")]
    NoData,

    /// Malformed query parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Dataset file could not be loaded
    #[error("Failed to load dataset {path}: {reason}")]
    Dataset { path: PathBuf, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis error
    #[error("Redis error: {0}")]
    Redis(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a timestamp parse error
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a dataset error
    pub fn dataset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Dataset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NoData)
    }
}
