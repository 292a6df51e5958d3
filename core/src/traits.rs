//! The service client trait
//!
//! Defined in core so the worker loop can drive any implementation. The HTTP
//! implementation lives in the `shortener-bench-client` crate; tests use
//! in-memory mocks.

use crate::error::ErrorKind;
use async_trait::async_trait;

/// Client for the service under test
///
/// Each call performs exactly one round trip. Implementations must not
/// retry; a failed call is reported to the worker, which records it and moves
/// on to the next iteration.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Send `input` to the transform (encode) endpoint and return its output
    async fn transform(&self, input: &str) -> Result<String, ServiceError>;

    /// Send a previously transformed value to the inverse (decode) endpoint
    async fn inverse(&self, value: &str) -> Result<String, ServiceError>;
}

/// Errors from a single service call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The call did not complete: connect failure, timeout, broken connection
    #[error("transport error: {message}")]
    Transport {
        /// Underlying error text
        message: String,
    },

    /// The service answered with a status other than 200
    #[error("unexpected status {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// A 200 response whose body was not the expected payload
    #[error("malformed response body: {message}")]
    Decode {
        /// Parse error text
        message: String,
    },
}

impl ServiceError {
    /// Build a transport error from any displayable cause
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        ServiceError::Transport {
            message: cause.to_string(),
        }
    }

    /// Build a decode error from any displayable cause
    pub fn decode(cause: impl std::fmt::Display) -> Self {
        ServiceError::Decode {
            message: cause.to_string(),
        }
    }

    /// Whether the service was unavailable rather than misbehaving
    ///
    /// Availability failures skip verification; anything else is treated as
    /// an unexpected fault by the worker.
    pub fn is_availability(&self) -> bool {
        matches!(
            self,
            ServiceError::Transport { .. } | ServiceError::Status { .. }
        )
    }

    /// Convert to ErrorKind for classification
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            ServiceError::Transport { .. } => ErrorKind::Transport,
            ServiceError::Status { .. } => ErrorKind::Status,
            ServiceError::Decode { .. } => ErrorKind::Unexpected,
        }
    }
}
