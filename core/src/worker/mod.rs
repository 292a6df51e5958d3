//! Worker module for driving load against the service
//!
//! The Worker is the core execution unit: a strictly sequential loop of
//! **acquire permit -> transform -> verify -> record -> repeat**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Waits for a permit from the shared rate limiter
//! 2. Synthesizes the next input and sends it to the transform endpoint
//! 3. Verifies the output (shape, then round trip through the inverse)
//! 4. Records the outcome in the shared `ResultAggregator`
//! 5. Optionally sleeps for a pacing delay
//! 6. Repeats for a fixed number of iterations or until shutdown
//!
//! A failing iteration, including one that panics, is logged and counted;
//! the worker always moves on to the next one.
//!
//! # Example
//!
//! ```ignore
//! use shortener_bench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .client(client)
//!     .verifier(verifier)
//!     .inputs(inputs)
//!     .rate_limiter(limiter)
//!     .aggregator(aggregator)
//!     .iterations(100)
//!     .build()?;
//!
//! let stats = worker.run(shutdown_rx).await?;
//! println!("Passed: {}", stats.passed);
//! ```

mod builder;
mod executor;
mod rate_limiter;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::{IterationOutcome, Worker};
pub use rate_limiter::RequestRateLimiter;
pub use stats::WorkerStats;
