//! shortener-bench-core: Load-generation engine for URL shortener services
//!
//! This crate provides the pieces that drive a verification load test
//! against any transform/inverse service, including:
//!
//! - A global rate limiter shared by every worker
//! - Workers that synthesize inputs, call the service and verify results
//! - A worker pool with a run deadline and graceful shutdown
//! - Lock-free result counters with progress reporting
//! - Configuration and error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod harness;
pub mod metrics;
pub mod pool;
pub mod request;
pub mod traits;
pub mod verify;
pub mod worker;

#[cfg(test)]
mod mock;

pub use config::{ConfigError, LoadTestConfig, ShapeBase, TransportConfig, MIN_RATE_LIMIT};
pub use error::*;
pub use harness::{Harness, RunReport};
pub use metrics::*;
pub use pool::{PoolOutcome, PoolSummary, WorkerPool, WorkerPoolBuilder};
pub use request::*;
pub use traits::*;
pub use verify::{VerificationFailure, VerificationOutcome, Verifier};
pub use worker::{RequestRateLimiter, Worker, WorkerBuilder, WorkerStats};
