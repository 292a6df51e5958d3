//! Client construction errors

use shortener_bench_core::BenchError;

/// Errors raised while building the HTTP client
///
/// Per-call failures are reported as
/// [`ServiceError`](shortener_bench_core::ServiceError) instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The base URL is not an absolute http(s) URL
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// reqwest refused the transport settings
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

impl From<ClientError> for BenchError {
    fn from(err: ClientError) -> Self {
        BenchError::config(err.to_string())
    }
}
