//! Worker pool execution logic

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

use crate::config::LoadTestConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::ResultAggregator;
use crate::request::InputGenerator;
use crate::traits::ServiceClient;
use crate::verify::Verifier;
use crate::worker::{RequestRateLimiter, WorkerBuilder, WorkerStats};

use super::aggregator::aggregate_worker_stats;

/// How long a worker gets to notice the shutdown signal before it is aborted
const ABANDON_GRACE: Duration = Duration::from_secs(1);

/// Deadline used when `now + timeout` is not representable (about 30 years)
const UNBOUNDED_WAIT: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// What came back from a pool run
#[derive(Debug, Clone, Default)]
pub struct PoolOutcome {
    /// Stats from every worker that returned
    pub worker_stats: Vec<WorkerStats>,

    /// Whether the run deadline expired before all workers finished
    pub timed_out: bool,

    /// Whether the run was stopped early by Ctrl+C or an explicit shutdown
    pub interrupted: bool,

    /// Workers that ignored shutdown and were aborted
    pub abandoned: usize,

    /// Workers that returned an error or panicked outside an iteration
    pub worker_failures: usize,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// WorkerPool manages one load test run
///
/// Responsible for spawning workers, enforcing the run deadline,
/// coordinating shutdown, and collecting results.
pub struct WorkerPool {
    /// Load test configuration (validated)
    pub(crate) config: LoadTestConfig,

    /// Service client (shared across workers)
    pub(crate) client: Arc<dyn ServiceClient>,

    /// Verifier (shared across workers)
    pub(crate) verifier: Arc<Verifier>,

    /// Input synthesizer (shared across workers)
    pub(crate) inputs: Arc<InputGenerator>,

    /// Global rate limiter
    pub(crate) rate_limiter: Arc<RequestRateLimiter>,

    /// Run-wide counters
    pub(crate) aggregator: Arc<ResultAggregator>,

    /// Shutdown signal sender
    pub(crate) shutdown_tx: broadcast::Sender<()>,

    /// Set when shutdown was requested from outside the pool
    pub(crate) interrupted: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Create a new pool
    ///
    /// Use `WorkerPoolBuilder` for validated construction.
    pub fn new(
        config: LoadTestConfig,
        client: Arc<dyn ServiceClient>,
        rate_limiter: Arc<RequestRateLimiter>,
        aggregator: Arc<ResultAggregator>,
    ) -> Self {
        let verifier = Arc::new(Verifier::new(Arc::clone(&client)));
        let inputs = Arc::new(InputGenerator::from_config(&config));
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            client,
            verifier,
            inputs,
            rate_limiter,
            aggregator,
            shutdown_tx,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a shutdown signal receiver
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Trigger shutdown of all workers
    ///
    /// The run is reported as interrupted.
    pub fn shutdown(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    /// Get the load test configuration
    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Get the shared result aggregator
    pub fn aggregator(&self) -> &Arc<ResultAggregator> {
        &self.aggregator
    }

    /// Run every worker to completion or until `timeout` elapses
    ///
    /// On expiry the shutdown signal is broadcast and the remaining workers
    /// share one short grace period before their tasks are aborted.
    pub async fn run(&self, timeout: Duration) -> BenchResult<PoolOutcome> {
        let start = Instant::now();
        let now = tokio::time::Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + UNBOUNDED_WAIT);

        tracing::info!(
            client = self.client.name(),
            workers = self.config.workers,
            requests_per_worker = self.config.requests_per_worker,
            rate_limit = self.config.rate_limit,
            timeout_secs = timeout.as_secs_f64(),
            "Starting load test"
        );

        let mut handles = Vec::with_capacity(self.config.workers);
        for worker_id in 0..self.config.workers {
            let worker = WorkerBuilder::new(worker_id)
                .client(Arc::clone(&self.client))
                .verifier(Arc::clone(&self.verifier))
                .inputs(Arc::clone(&self.inputs))
                .rate_limiter(Arc::clone(&self.rate_limiter))
                .aggregator(Arc::clone(&self.aggregator))
                .iterations(self.config.requests_per_worker)
                .pacing_delay(self.config.pacing_delay())
                .build()?;
            let shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(async move { worker.run(shutdown_rx).await }));
        }

        let mut outcome = PoolOutcome::default();
        // One grace window shared by every worker still running at the deadline
        let mut grace_deadline = None;
        for (worker_id, mut handle) in handles.into_iter().enumerate() {
            let grace = match grace_deadline {
                Some(grace) => grace,
                None => match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(joined) => {
                        collect(worker_id, joined, &mut outcome);
                        continue;
                    }
                    Err(_) => {
                        outcome.timed_out = true;
                        tracing::warn!(
                            timeout_secs = timeout.as_secs_f64(),
                            "Run deadline reached, shutting down remaining workers"
                        );
                        let _ = self.shutdown_tx.send(());
                        let grace = tokio::time::Instant::now() + ABANDON_GRACE;
                        grace_deadline = Some(grace);
                        grace
                    }
                },
            };

            reap(worker_id, handle, grace, &mut outcome).await;
        }

        let short_worker = outcome
            .worker_stats
            .iter()
            .any(|s| s.iterations < self.config.requests_per_worker);
        outcome.interrupted =
            self.interrupted.load(Ordering::SeqCst) || (!outcome.timed_out && short_worker);

        // If all workers failed, return an error
        if outcome.worker_stats.is_empty() && outcome.worker_failures > 0 {
            return Err(BenchError::orchestration(format!(
                "All {} workers failed to complete",
                outcome.worker_failures
            )));
        }

        outcome.elapsed = start.elapsed();
        let summary = aggregate_worker_stats(&outcome.worker_stats);
        tracing::info!(
            elapsed_secs = outcome.elapsed.as_secs_f64(),
            iterations = summary.total_iterations,
            passed = summary.total_passed,
            failures = summary.total_failures(),
            rps = summary.iterations_per_second,
            timed_out = outcome.timed_out,
            interrupted = outcome.interrupted,
            abandoned = outcome.abandoned,
            "Load test finished"
        );

        Ok(outcome)
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C triggers the same graceful shutdown as the deadline.
    pub async fn run_with_signal_handling(&self, timeout: Duration) -> BenchResult<PoolOutcome> {
        let shutdown_tx = self.shutdown_tx.clone();
        let interrupted = Arc::clone(&self.interrupted);

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                    interrupted.store(true, Ordering::SeqCst);
                    let _ = shutdown_tx.send(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run(timeout).await;

        signal_handle.abort();

        result
    }
}

/// Wait for a signalled worker until `grace`, abort it if it does not stop
async fn reap(
    worker_id: usize,
    mut handle: JoinHandle<BenchResult<WorkerStats>>,
    grace: tokio::time::Instant,
    outcome: &mut PoolOutcome,
) {
    match tokio::time::timeout_at(grace, &mut handle).await {
        Ok(joined) => collect(worker_id, joined, outcome),
        Err(_) => {
            handle.abort();
            outcome.abandoned += 1;
            tracing::warn!(worker_id, "Worker did not stop in time, abandoned");
        }
    }
}

fn collect(
    worker_id: usize,
    joined: Result<BenchResult<WorkerStats>, JoinError>,
    outcome: &mut PoolOutcome,
) {
    match joined {
        Ok(Ok(stats)) => {
            tracing::debug!(
                worker_id,
                iterations = stats.iterations,
                failures = stats.failures(),
                "Worker completed"
            );
            outcome.worker_stats.push(stats);
        }
        Ok(Err(e)) => {
            outcome.worker_failures += 1;
            tracing::error!(worker_id, error = %e, "Worker returned error");
        }
        Err(e) => {
            outcome.worker_failures += 1;
            tracing::error!(worker_id, error = %e, "Worker task panicked");
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("client", &self.client.name())
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}
