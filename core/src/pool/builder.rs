//! Builder pattern for WorkerPool construction

use std::sync::Arc;

use crate::config::LoadTestConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::ResultAggregator;
use crate::traits::ServiceClient;
use crate::worker::RequestRateLimiter;

use super::executor::WorkerPool;

/// Builder for creating a WorkerPool with validated configuration
///
/// # Example
///
/// ```ignore
/// let pool = WorkerPoolBuilder::new()
///     .workers(10)
///     .requests_per_worker(1000)
///     .rate_limit(30.0)
///     .client(client)
///     .build()?;
/// ```
pub struct WorkerPoolBuilder {
    config: LoadTestConfig,
    client: Option<Arc<dyn ServiceClient>>,
    aggregator: Option<Arc<ResultAggregator>>,
}

impl WorkerPoolBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LoadTestConfig::default(),
            client: None,
            aggregator: None,
        }
    }

    /// Set the full load test configuration
    pub fn config(mut self, config: LoadTestConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the iterations per worker
    pub fn requests_per_worker(mut self, n: usize) -> Self {
        self.config.requests_per_worker = n;
        self
    }

    /// Set the global rate limit (requests per second)
    pub fn rate_limit(mut self, rps: f64) -> Self {
        self.config.rate_limit = rps;
        self
    }

    /// Set the service client
    pub fn client(mut self, client: Arc<dyn ServiceClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use an existing aggregator instead of creating one
    pub fn aggregator(mut self, aggregator: Arc<ResultAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Build the pool
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not set or the configuration does
    /// not validate.
    pub fn build(self) -> BenchResult<WorkerPool> {
        let client = self
            .client
            .ok_or_else(|| BenchError::missing_config("client"))?;

        self.config.validate()?;

        let aggregator = self
            .aggregator
            .unwrap_or_else(|| Arc::new(ResultAggregator::new(self.config.progress_interval)));
        let rate_limiter = Arc::new(RequestRateLimiter::new(Some(self.config.rate_limit)));

        Ok(WorkerPool::new(self.config, client, rate_limiter, aggregator))
    }
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
