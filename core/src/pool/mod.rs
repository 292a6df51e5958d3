//! Worker pool for run lifecycle management
//!
//! The WorkerPool coordinates one load test run:
//! - Spawning `W` worker tasks that share a rate limiter and aggregator
//! - Bounding the whole run with a deadline
//! - Managing shutdown via a broadcast channel (deadline or Ctrl+C)
//! - Collecting per-worker stats
//!
//! # Example
//!
//! ```ignore
//! use shortener_bench_core::{LoadTestConfig, WorkerPoolBuilder};
//!
//! let pool = WorkerPoolBuilder::new()
//!     .config(LoadTestConfig::new(10))
//!     .client(client)
//!     .build()?;
//!
//! let outcome = pool.run_with_signal_handling(pool.config().run_timeout()).await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, PoolSummary};
pub use builder::WorkerPoolBuilder;
pub use executor::{PoolOutcome, WorkerPool};
