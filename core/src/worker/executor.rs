//! Worker execution loop

use crate::error::{BenchError, BenchResult};
use crate::metrics::ResultAggregator;
use crate::request::InputGenerator;
use crate::traits::{ServiceClient, ServiceError};
use crate::verify::{VerificationFailure, VerificationOutcome, Verifier};

use super::rate_limiter::RequestRateLimiter;
use super::stats::WorkerStats;

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// What happened in one iteration that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Transform succeeded and the output verified
    Passed,
    /// The transform call failed at the transport or status level;
    /// verification was skipped
    TransformFailed(ServiceError),
    /// The output failed the shape or round-trip check
    VerificationFailed(VerificationFailure),
}

/// Worker runs a fixed number of iterations: acquire -> transform -> verify -> record
///
/// Workers are tokio tasks managed by the `WorkerPool`. Everything they
/// touch besides their own stats is shared via `Arc`.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Service client (shared across workers)
    client: Arc<dyn ServiceClient>,

    /// Output verifier (shared across workers)
    verifier: Arc<Verifier>,

    /// Input synthesizer
    inputs: Arc<InputGenerator>,

    /// Global rate limiter (shared across workers)
    rate_limiter: Arc<RequestRateLimiter>,

    /// Run-wide counters (shared across workers)
    aggregator: Arc<ResultAggregator>,

    /// Number of iterations to run
    iterations: usize,

    /// Optional sleep after each iteration
    pacing_delay: Option<Duration>,
}

impl Worker {
    /// Create a new worker
    ///
    /// Use `WorkerBuilder` for a more ergonomic construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        client: Arc<dyn ServiceClient>,
        verifier: Arc<Verifier>,
        inputs: Arc<InputGenerator>,
        rate_limiter: Arc<RequestRateLimiter>,
        aggregator: Arc<ResultAggregator>,
        iterations: usize,
        pacing_delay: Option<Duration>,
    ) -> Self {
        Self {
            id,
            client,
            verifier,
            inputs,
            rate_limiter,
            aggregator,
            iterations,
            pacing_delay,
        }
    }

    /// Run the worker loop
    ///
    /// Returns WorkerStats when every iteration has run or the shutdown
    /// signal arrives, whichever comes first.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> BenchResult<WorkerStats> {
        let mut stats = WorkerStats::new();
        stats.start();

        tracing::debug!(
            worker_id = self.id,
            iterations = self.iterations,
            "Worker started"
        );

        for iteration in 0..self.iterations {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    tracing::debug!(worker_id = self.id, iteration, "Worker received shutdown signal");
                    break;
                }

                result = self.run_iteration(iteration) => {
                    self.record(iteration, result, &mut stats);
                }
            }

            if let Some(delay) = self.pacing_delay {
                tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        tracing::debug!(worker_id = self.id, iteration, "Worker received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            iterations = stats.iterations,
            passed = stats.passed,
            failures = stats.failures(),
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Run one iteration, turning a panic into an unexpected fault
    async fn run_iteration(&self, iteration: usize) -> BenchResult<IterationOutcome> {
        match AssertUnwindSafe(self.execute_one(iteration))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(BenchError::unexpected(format!(
                "iteration panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    /// Execute a single iteration
    async fn execute_one(&self, iteration: usize) -> BenchResult<IterationOutcome> {
        // 1. Wait for a permit
        self.rate_limiter.acquire().await;

        // 2. Transform
        let record = self.inputs.record(iteration);
        let transformed = self.client.transform(&record.original_input).await;
        self.aggregator.record_attempt();

        let transformed = match transformed {
            Ok(value) => value,
            Err(e) if e.is_availability() => return Ok(IterationOutcome::TransformFailed(e)),
            Err(e) => {
                return Err(BenchError::unexpected(format!(
                    "transform of {} failed: {e}",
                    record.original_input
                )))
            }
        };

        // 3. Verify
        match self.verifier.verify(&record, &transformed).await {
            Ok(VerificationOutcome::Passed) => Ok(IterationOutcome::Passed),
            Ok(VerificationOutcome::Failed(failure)) => {
                Ok(IterationOutcome::VerificationFailed(failure))
            }
            Err(e) => Err(BenchError::unexpected(format!(
                "inverse of {transformed} failed: {e}"
            ))),
        }
    }

    /// Update the shared counters and this worker's stats
    fn record(
        &self,
        iteration: usize,
        result: BenchResult<IterationOutcome>,
        stats: &mut WorkerStats,
    ) {
        match result {
            Ok(IterationOutcome::Passed) => stats.record_passed(),
            Ok(IterationOutcome::TransformFailed(e)) => {
                self.aggregator.record_transport_failure();
                stats.record_transport_failure();
                tracing::warn!(
                    worker_id = self.id,
                    iteration,
                    kind = %e.to_error_kind(),
                    error = %e,
                    "Transform call failed"
                );
            }
            Ok(IterationOutcome::VerificationFailed(failure)) => {
                self.aggregator.record_error();
                stats.record_verification_error();
                tracing::warn!(
                    worker_id = self.id,
                    iteration,
                    kind = %failure.kind(),
                    "{failure}"
                );
            }
            Err(e) => {
                self.aggregator.record_fault();
                stats.record_fault();
                tracing::error!(
                    worker_id = self.id,
                    iteration,
                    error = %e,
                    "Iteration faulted, continuing"
                );
            }
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("client", &self.client.name())
            .field("rate_limiter", &self.rate_limiter)
            .field("iterations", &self.iterations)
            .field("pacing_delay", &self.pacing_delay)
            .finish()
    }
}
