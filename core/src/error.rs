//! Error types for shortener-bench-core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of everything that can go wrong during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service call did not complete (connect failure, timeout, I/O)
    Transport,
    /// The service answered with a non-success status code
    Status,
    /// Transformed output had the wrong length
    Shape,
    /// Inverse of the transformed output did not reproduce the input
    RoundTrip,
    /// Anything else that went wrong inside an iteration
    Unexpected,
    /// Invalid or missing configuration
    Config,
    /// The run was shut down while waiting
    Shutdown,
    /// Worker pool lifecycle failure
    Orchestration,
}

impl ErrorKind {
    /// Stable snake_case identifier, used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Status => "status",
            ErrorKind::Shape => "shape",
            ErrorKind::RoundTrip => "round_trip",
            ErrorKind::Unexpected => "unexpected",
            ErrorKind::Config => "config",
            ErrorKind::Shutdown => "shutdown",
            ErrorKind::Orchestration => "orchestration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct BenchError {
    /// Error classification
    pub kind: ErrorKind,
    /// Human readable detail
    pub message: String,
}

impl BenchError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// A builder was asked to build without a required field
    pub fn missing_config(field: &str) -> Self {
        Self::config(format!("missing required field: {field}"))
    }

    /// Unexpected fault inside an iteration
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// The run is shutting down
    pub fn shutdown() -> Self {
        Self::new(ErrorKind::Shutdown, "shutdown requested")
    }

    /// Worker pool lifecycle failure
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Orchestration, message)
    }
}

impl From<crate::config::ConfigError> for BenchError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;
