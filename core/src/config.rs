//! Load test configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Lowest accepted rate limit: one request every ~11.6 days
pub const MIN_RATE_LIMIT: f64 = 1e-6;

/// Which length the shape check adds the suffix length to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeBase {
    /// Expected length is the length of the original input plus the suffix
    #[default]
    Input,
    /// Expected length is the length of the input prefix plus the suffix
    ///
    /// This matches services that return `<domain>/<fixed-length code>`
    /// regardless of how long the original input was.
    Prefix,
}

impl std::str::FromStr for ShapeBase {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "input" => Ok(ShapeBase::Input),
            "prefix" => Ok(ShapeBase::Prefix),
            other => Err(ConfigError::Invalid(format!(
                "unknown shape base '{other}', expected 'input' or 'prefix'"
            ))),
        }
    }
}

/// Connection pool and timeout settings for the service transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    /// Maximum concurrent connections across all targets
    pub max_connections: usize,

    /// Maximum pooled connections per target host
    pub max_connections_per_host: usize,

    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_connections: 50,
            max_connections_per_host: 50,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
        }
    }
}

impl TransportConfig {
    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Read timeout as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "transport.max_connections must be at least 1".into(),
            ));
        }
        if self.max_connections_per_host == 0 {
            return Err(ConfigError::Invalid(
                "transport.max_connections_per_host must be at least 1".into(),
            ));
        }
        if self.max_connections_per_host > self.max_connections {
            return Err(ConfigError::Invalid(format!(
                "transport.max_connections_per_host ({}) exceeds max_connections ({})",
                self.max_connections_per_host, self.max_connections
            )));
        }
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "transport timeouts must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Load test configuration
///
/// Describes the target service, the synthetic inputs sent to it, the
/// offered load, and the bounds on how long a run may take. Every field
/// has a default so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadTestConfig {
    /// Base URL of the service, e.g. `http://localhost:9000/api/v1`
    pub base_url: String,

    /// Prefix used to synthesize inputs (`<prefix>test<n>`)
    pub input_prefix: String,

    /// Number of parallel workers
    pub workers: usize,

    /// Iterations each worker performs
    pub requests_per_worker: usize,

    /// Global offered rate in requests per second, shared by all workers
    pub rate_limit: f64,

    /// Fixed number of characters the transform adds to its base length
    pub suffix_length: usize,

    /// What the suffix length is added to
    pub shape_base: ShapeBase,

    /// Optional extra sleep after every iteration, per worker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacing_delay_ms: Option<u64>,

    /// Emit a progress line every N attempts (global count)
    pub progress_interval: u64,

    /// Slack added to the expected run duration before workers are abandoned
    pub shutdown_grace_secs: u64,

    /// Hard deadline for the whole pool; derived when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,

    /// Transport settings
    pub transport: TransportConfig,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000/api/v1".to_string(),
            input_prefix: "http://mydomain.com/".to_string(),
            workers: 10,
            requests_per_worker: 10_000,
            rate_limit: 30.0,
            suffix_length: 6,
            shape_base: ShapeBase::Input,
            pacing_delay_ms: None,
            progress_interval: 100,
            shutdown_grace_secs: 60,
            run_timeout_secs: None,
            transport: TransportConfig::default(),
        }
    }
}

impl LoadTestConfig {
    /// Create a config with the given worker count and defaults elsewhere
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    /// Set the per-worker iteration count
    pub fn with_requests_per_worker(mut self, n: usize) -> Self {
        self.requests_per_worker = n;
        self
    }

    /// Set the global rate limit
    pub fn with_rate_limit(mut self, rps: f64) -> Self {
        self.rate_limit = rps;
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set an explicit run timeout
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Total number of iterations across all workers
    pub fn total_requests(&self) -> usize {
        self.workers.saturating_mul(self.requests_per_worker)
    }

    /// Optional per-iteration pacing delay
    pub fn pacing_delay(&self) -> Option<Duration> {
        self.pacing_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Time the run needs at the configured rate
    pub fn expected_duration(&self) -> Duration {
        let by_rate = self.total_requests() as f64 / self.rate_limit;
        let by_pacing = self
            .pacing_delay()
            .map(|d| d.as_secs_f64() * self.requests_per_worker as f64)
            .unwrap_or(0.0);
        let secs = by_rate.max(by_pacing);
        if secs.is_nan() || secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        }
    }

    /// Deadline for the whole pool
    ///
    /// Uses `run_timeout_secs` when set, otherwise the expected duration plus
    /// the shutdown grace period.
    pub fn run_timeout(&self) -> Duration {
        match self.run_timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => self
                .expected_duration()
                .saturating_add(Duration::from_secs(self.shutdown_grace_secs)),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }

        if self.requests_per_worker == 0 {
            return Err(ConfigError::Invalid(
                "requests_per_worker must be at least 1".into(),
            ));
        }

        if !self.rate_limit.is_finite() || self.rate_limit <= 0.0 {
            return Err(ConfigError::Invalid(
                "rate_limit must be a positive number".into(),
            ));
        }

        if self.rate_limit < MIN_RATE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "rate_limit must be at least {MIN_RATE_LIMIT}, got {}",
                self.rate_limit
            )));
        }

        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress_interval must be at least 1".into(),
            ));
        }

        if self.run_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "run_timeout_secs must be positive".into(),
            ));
        }

        self.transport.validate()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is out of range or malformed
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The TOML document could not be parsed
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}
