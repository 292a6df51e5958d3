//! Worker statistics tracking

use std::time::{Duration, Instant};

/// Per-worker tally, returned when the worker finishes
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Iterations that ran to the end, whatever their outcome
    pub iterations: usize,

    /// Iterations whose output passed verification
    pub passed: usize,

    /// Shape or round-trip failures
    pub verification_errors: usize,

    /// Transform calls that failed at the transport or status level
    pub transport_failures: usize,

    /// Iterations that hit an unexpected fault
    pub faults: usize,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Iterations that did not pass
    pub fn failures(&self) -> usize {
        self.verification_errors + self.transport_failures + self.faults
    }

    /// Share of iterations that passed (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.passed as f64 / self.iterations as f64
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Iterations per second over the worker's lifetime
    pub fn iterations_per_second(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.iterations as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Record an iteration that passed verification
    pub fn record_passed(&mut self) {
        self.iterations += 1;
        self.passed += 1;
    }

    /// Record an iteration that failed verification
    pub fn record_verification_error(&mut self) {
        self.iterations += 1;
        self.verification_errors += 1;
    }

    /// Record an iteration whose transform call failed
    pub fn record_transport_failure(&mut self) {
        self.iterations += 1;
        self.transport_failures += 1;
    }

    /// Record an iteration that faulted
    pub fn record_fault(&mut self) {
        self.iterations += 1;
        self.faults += 1;
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &WorkerStats) {
        self.iterations += other.iterations;
        self.passed += other.passed;
        self.verification_errors += other.verification_errors;
        self.transport_failures += other.transport_failures;
        self.faults += other.faults;
    }
}
