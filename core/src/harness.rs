//! Load test driver
//!
//! [`Harness`] wires a validated [`LoadTestConfig`] and a [`ServiceClient`]
//! into a [`WorkerPool`], runs it under the configured deadline and returns a
//! [`RunReport`] carrying the final counters and the verdict.

use std::sync::Arc;
use std::time::Duration;

use crate::config::LoadTestConfig;
use crate::error::BenchResult;
use crate::metrics::RunStatistics;
use crate::pool::{aggregate_worker_stats, PoolOutcome, PoolSummary, WorkerPoolBuilder};
use crate::traits::ServiceClient;

/// Final result of a load test run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Aggregator snapshot taken after the pool stopped
    pub statistics: RunStatistics,

    /// Per-worker totals
    pub summary: PoolSummary,

    /// Whether the run deadline expired
    pub timed_out: bool,

    /// Whether the run was stopped early by Ctrl+C or an explicit shutdown
    pub interrupted: bool,

    /// Workers aborted after ignoring shutdown
    pub abandoned: usize,

    /// Workers that died outside an iteration
    pub worker_failures: usize,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunReport {
    fn from_outcome(statistics: RunStatistics, outcome: PoolOutcome) -> Self {
        Self {
            statistics,
            summary: aggregate_worker_stats(&outcome.worker_stats),
            timed_out: outcome.timed_out,
            interrupted: outcome.interrupted,
            abandoned: outcome.abandoned,
            worker_failures: outcome.worker_failures,
            elapsed: outcome.elapsed,
        }
    }

    /// Whether every iteration ran in time with no failure of any kind
    pub fn passed(&self) -> bool {
        self.statistics.is_clean()
            && !self.timed_out
            && !self.interrupted
            && self.abandoned == 0
            && self.worker_failures == 0
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// Final verdict line
    ///
    /// The error count is the same `total_errors` printed on the
    /// `error count =` line; other failure categories are listed after it.
    pub fn verdict(&self) -> String {
        if self.passed() {
            return "Load test completed without errors".to_string();
        }

        let s = &self.statistics;
        let ending = if self.timed_out {
            "timed out"
        } else if self.interrupted {
            "was interrupted"
        } else {
            "completed"
        };
        let mut line = format!("Load test {ending} with {} errors", s.total_errors);
        if s.transport_failures > 0 || s.faults > 0 {
            line.push_str(&format!(
                " ({} transport failures, {} faults)",
                s.transport_failures, s.faults
            ));
        }
        line
    }

    /// Lines written by [`print_summary`](Self::print_summary)
    pub fn summary_lines(&self) -> Vec<String> {
        let s = &self.statistics;
        let mut lines = vec![
            format!("error count = {}", s.total_errors),
            format!(
                "attempted = {}, transport failures = {}, faults = {}",
                s.total_attempted, s.transport_failures, s.faults
            ),
            format!(
                "elapsed = {:.2}s, throughput = {:.2} ops/s",
                self.elapsed.as_secs_f64(),
                self.summary.iterations_per_second
            ),
        ];
        if self.timed_out {
            lines.push(format!(
                "run deadline expired ({} workers abandoned)",
                self.abandoned
            ));
        } else if self.interrupted {
            lines.push("run interrupted before all iterations completed".to_string());
        }
        lines.push(self.verdict());
        lines
    }

    /// Print the summary to stdout
    pub fn print_summary(&self) {
        for line in self.summary_lines() {
            println!("{line}");
        }
    }
}

/// Drives one load test run
pub struct Harness {
    config: LoadTestConfig,
    client: Arc<dyn ServiceClient>,
    handle_signals: bool,
}

impl Harness {
    /// Create a harness for `config` against `client`
    pub fn new(config: LoadTestConfig, client: Arc<dyn ServiceClient>) -> Self {
        Self {
            config,
            client,
            handle_signals: true,
        }
    }

    /// Do not install a Ctrl+C handler for the run
    pub fn without_signal_handling(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Run the load test to completion or deadline
    ///
    /// # Errors
    ///
    /// Fails only when the configuration is invalid or every worker died;
    /// per-iteration failures are reported through the [`RunReport`].
    pub async fn run(&self) -> BenchResult<RunReport> {
        let pool = WorkerPoolBuilder::new()
            .config(self.config.clone())
            .client(Arc::clone(&self.client))
            .build()?;

        let timeout = self.config.run_timeout();
        tracing::info!(
            base_url = %self.config.base_url,
            total_requests = self.config.total_requests(),
            expected_secs = self.config.expected_duration().as_secs_f64(),
            timeout_secs = timeout.as_secs_f64(),
            "Load test configured"
        );

        let outcome = if self.handle_signals {
            pool.run_with_signal_handling(timeout).await?
        } else {
            pool.run(timeout).await?
        };

        let report = RunReport::from_outcome(pool.aggregator().snapshot(), outcome);
        if report.passed() {
            tracing::info!(
                attempted = report.statistics.total_attempted,
                "{}",
                report.verdict()
            );
        } else {
            tracing::warn!(
                attempted = report.statistics.total_attempted,
                errors = report.statistics.total_errors,
                transport_failures = report.statistics.transport_failures,
                faults = report.statistics.faults,
                timed_out = report.timed_out,
                interrupted = report.interrupted,
                "{}",
                report.verdict()
            );
        }

        Ok(report)
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("client", &self.client.name())
            .finish()
    }
}
