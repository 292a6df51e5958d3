//! Result aggregation from multiple workers

use std::time::Duration;

use crate::worker::WorkerStats;

/// Totals across all workers that reported back
#[derive(Debug, Clone, Default)]
pub struct PoolSummary {
    /// Number of workers that reported stats
    pub total_workers: usize,

    /// Iterations that ran to completion
    pub total_iterations: usize,

    /// Iterations that passed verification
    pub total_passed: usize,

    /// Shape and round-trip failures
    pub total_verification_errors: usize,

    /// Failed transform calls
    pub total_transport_failures: usize,

    /// Faulted iterations
    pub total_faults: usize,

    /// Longest worker lifetime
    pub total_duration: Duration,

    /// Achieved iterations per second across the pool
    pub iterations_per_second: f64,
}

impl PoolSummary {
    /// Iterations that did not pass
    pub fn total_failures(&self) -> usize {
        self.total_verification_errors + self.total_transport_failures + self.total_faults
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_iterations > 0 {
            self.total_passed as f64 / self.total_iterations as f64
        } else {
            0.0
        }
    }

    /// Get the error rate (0.0 - 1.0)
    pub fn error_rate(&self) -> f64 {
        if self.total_iterations > 0 {
            self.total_failures() as f64 / self.total_iterations as f64
        } else {
            0.0
        }
    }
}

/// Aggregate statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> PoolSummary {
    if stats.is_empty() {
        return PoolSummary::default();
    }

    let mut merged = WorkerStats::new();
    for s in stats {
        merged.merge(s);
    }

    // Workers run concurrently, so the pool lasted as long as its slowest one
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let iterations_per_second = if secs > 0.0 {
        merged.iterations as f64 / secs
    } else {
        0.0
    };

    PoolSummary {
        total_workers: stats.len(),
        total_iterations: merged.iterations,
        total_passed: merged.passed,
        total_verification_errors: merged.verification_errors,
        total_transport_failures: merged.transport_failures,
        total_faults: merged.faults,
        total_duration,
        iterations_per_second,
    }
}
