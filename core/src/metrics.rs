//! Run-wide result counters and progress reporting

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Transform calls attempted
    pub total_attempted: u64,

    /// Verification failures (shape and round trip)
    pub total_errors: u64,

    /// Transform calls that failed at the transport or status level
    pub transport_failures: u64,

    /// Iterations that hit an unexpected fault
    pub faults: u64,
}

impl RunStatistics {
    /// Every failure the run observed, of any kind
    pub fn failed_total(&self) -> u64 {
        self.total_errors + self.transport_failures + self.faults
    }

    /// Whether nothing went wrong
    pub fn is_clean(&self) -> bool {
        self.failed_total() == 0
    }
}

/// Thread-safe result counters shared by every worker
///
/// All updates are single atomic increments, so workers never contend on a
/// lock. [`snapshot`](Self::snapshot) reads each counter independently; the
/// values are individually exact but not a joint atomic view.
#[derive(Debug)]
pub struct ResultAggregator {
    attempted: AtomicU64,
    errors: AtomicU64,
    transport_failures: AtomicU64,
    faults: AtomicU64,
    progress_interval: u64,
}

impl ResultAggregator {
    /// Create an aggregator that logs progress every `progress_interval` attempts
    pub fn new(progress_interval: u64) -> Self {
        Self {
            attempted: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            progress_interval: progress_interval.max(1),
        }
    }

    /// Count one attempt and return the new global attempt count
    pub fn record_attempt(&self) -> u64 {
        let count = self.attempted.fetch_add(1, Ordering::SeqCst) + 1;
        if count % self.progress_interval == 0 {
            tracing::info!(
                operations = count,
                errors = self.errors.load(Ordering::Relaxed),
                "Operations performed: {count}"
            );
        }
        count
    }

    /// Count one verification failure
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    /// Count one transport or status failure of the transform call
    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::SeqCst);
    }

    /// Count one unexpected fault
    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::SeqCst);
    }

    /// Current counter values
    pub fn snapshot(&self) -> RunStatistics {
        RunStatistics {
            total_attempted: self.attempted.load(Ordering::SeqCst),
            total_errors: self.errors.load(Ordering::SeqCst),
            transport_failures: self.transport_failures.load(Ordering::SeqCst),
            faults: self.faults.load(Ordering::SeqCst),
        }
    }

    /// Progress interval in attempts
    pub fn progress_interval(&self) -> u64 {
        self.progress_interval
    }
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_aggregator_starts_at_zero() {
        let aggregator = ResultAggregator::default();
        assert_eq!(aggregator.snapshot(), RunStatistics::default());
        assert!(aggregator.snapshot().is_clean());
        assert_eq!(aggregator.progress_interval(), 100);
    }

    #[test]
    fn test_record_attempt_returns_count() {
        let aggregator = ResultAggregator::new(100);
        assert_eq!(aggregator.record_attempt(), 1);
        assert_eq!(aggregator.record_attempt(), 2);
        assert_eq!(aggregator.snapshot().total_attempted, 2);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let aggregator = ResultAggregator::new(0);
        assert_eq!(aggregator.progress_interval(), 1);
        aggregator.record_attempt();
    }

    #[test]
    fn test_failed_total() {
        let stats = RunStatistics {
            total_attempted: 10,
            total_errors: 2,
            transport_failures: 3,
            faults: 1,
        };
        assert_eq!(stats.failed_total(), 6);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        const WORKERS: usize = 8;
        const PER_WORKER: usize = 10_000;

        let aggregator = Arc::new(ResultAggregator::new(1_000));
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                let aggregator = Arc::clone(&aggregator);
                std::thread::spawn(move || {
                    for i in 0..PER_WORKER {
                        aggregator.record_attempt();
                        if i % 10 == 0 {
                            aggregator.record_error();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("counter thread panicked");
        }

        let stats = aggregator.snapshot();
        assert_eq!(stats.total_attempted, (WORKERS * PER_WORKER) as u64);
        assert_eq!(stats.total_errors, (WORKERS * PER_WORKER / 10) as u64);
        assert!(stats.total_errors <= stats.total_attempted);
    }
}
