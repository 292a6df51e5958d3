//! HTTP client for the URL shortener under test
//!
//! This crate provides the [`ServiceClient`](shortener_bench_core::ServiceClient)
//! implementation that talks to a running shortener over HTTP:
//!
//! - `POST {base_url}/encode` with `{"originalUrl": ...}`
//! - `GET {base_url}/decode?shortenedUrl=...`

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod http;

pub use error::ClientError;
pub use http::HttpServiceClient;

#[cfg(test)]
mod tests;
