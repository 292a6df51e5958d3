//! Rate limiting for request execution

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use std::time::Duration;

/// Rate limiter using the GCRA token bucket from the governor crate
///
/// Permits are issued one interval (`1 / rate`) apart with a burst size of
/// one, so a worker that has been idle cannot fire a backlog of queued
/// permits. A single instance is meant to be shared across all workers via
/// `Arc`; the underlying state is lock-free.
pub struct RequestRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    rate_limit: Option<f64>,
    interval: Option<Duration>,
}

impl RequestRateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `rate_limit` - Optional requests per second limit. None, zero or a
    ///   negative value disables rate limiting. Fractional rates are honored.
    ///
    /// # Examples
    /// ```
    /// use shortener_bench_core::worker::RequestRateLimiter;
    ///
    /// // One permit every 500ms
    /// let limiter = RequestRateLimiter::new(Some(2.0));
    /// assert!(limiter.is_enabled());
    ///
    /// // No limit
    /// let unlimited = RequestRateLimiter::new(None);
    /// assert!(!unlimited.is_enabled());
    /// ```
    pub fn new(rate_limit: Option<f64>) -> Self {
        let interval = rate_limit
            .filter(|rps| rps.is_finite() && *rps > 0.0)
            .and_then(|rps| Duration::try_from_secs_f64(1.0 / rps).ok());
        let limiter = interval
            .and_then(Quota::with_period)
            .map(RateLimiter::direct);

        Self {
            interval: limiter.as_ref().and(interval),
            limiter,
            rate_limit,
        }
    }

    /// Create an unlimited rate limiter (no rate limiting)
    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Wait until the next permit is available
    ///
    /// Returns immediately if no rate limit is configured.
    pub async fn acquire(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Try to take a permit without waiting
    ///
    /// Returns `true` if a permit was taken, `false` otherwise.
    /// Always returns `true` if no rate limit is configured.
    pub fn try_acquire(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Get the configured rate limit (requests per second)
    pub fn rate_limit(&self) -> Option<f64> {
        self.rate_limit
    }

    /// Time between consecutive permits, if limiting is enabled
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for RequestRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRateLimiter")
            .field("rate_limit", &self.rate_limit)
            .field("interval", &self.interval)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
