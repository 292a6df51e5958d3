//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use shortener_bench_client::HttpServiceClient;
use shortener_bench_core::{Harness, LoadTestConfig, ShapeBase};

#[derive(Parser)]
#[command(name = "shortener-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test against a shortener service
    Run(RunArgs),
    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Options for `run`; flags override values from `--config`
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the service API
    #[arg(long, env = "SHORTENER_BENCH_BASE_URL")]
    pub base_url: Option<String>,

    /// Number of concurrent workers
    #[arg(short, long, env = "SHORTENER_BENCH_WORKERS")]
    pub workers: Option<usize>,

    /// Iterations each worker runs
    #[arg(short = 'n', long, env = "SHORTENER_BENCH_REQUESTS_PER_WORKER")]
    pub requests_per_worker: Option<usize>,

    /// Global request rate across all workers (requests per second)
    #[arg(short, long, env = "SHORTENER_BENCH_RATE_LIMIT")]
    pub rate_limit: Option<f64>,

    /// Prefix of every synthetic input
    #[arg(long)]
    pub input_prefix: Option<String>,

    /// Characters the service appends per transform
    #[arg(long)]
    pub suffix_length: Option<usize>,

    /// Base of the shape check: `input` or `prefix`
    #[arg(long)]
    pub shape_base: Option<ShapeBase>,

    /// Extra per-iteration sleep in milliseconds
    #[arg(long)]
    pub pacing_delay_ms: Option<u64>,

    /// Log a progress line every N attempts
    #[arg(long)]
    pub progress_interval: Option<u64>,

    /// Hard deadline for the whole run in seconds
    #[arg(long)]
    pub run_timeout_secs: Option<u64>,

    /// Maximum concurrent connections
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Maximum pooled connections per host
    #[arg(long)]
    pub max_connections_per_host: Option<usize>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,
}

impl RunArgs {
    /// Load the base config (file or defaults) and apply flag overrides
    pub fn resolve(&self) -> Result<LoadTestConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => LoadTestConfig::default(),
        };

        if let Some(v) = &self.base_url {
            config.base_url = v.clone();
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.requests_per_worker {
            config.requests_per_worker = v;
        }
        if let Some(v) = self.rate_limit {
            config.rate_limit = v;
        }
        if let Some(v) = &self.input_prefix {
            config.input_prefix = v.clone();
        }
        if let Some(v) = self.suffix_length {
            config.suffix_length = v;
        }
        if let Some(v) = self.shape_base {
            config.shape_base = v;
        }
        if let Some(v) = self.pacing_delay_ms {
            config.pacing_delay_ms = Some(v);
        }
        if let Some(v) = self.progress_interval {
            config.progress_interval = v;
        }
        if let Some(v) = self.run_timeout_secs {
            config.run_timeout_secs = Some(v);
        }
        if let Some(v) = self.max_connections {
            config.transport.max_connections = v;
        }
        if let Some(v) = self.max_connections_per_host {
            config.transport.max_connections_per_host = v;
        }
        if let Some(v) = self.connect_timeout_ms {
            config.transport.connect_timeout_ms = v;
        }
        if let Some(v) = self.read_timeout_ms {
            config.transport.read_timeout_ms = v;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<LoadTestConfig> {
    LoadTestConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

/// Run the load test and return the process exit code
pub async fn run(args: RunArgs) -> Result<u8> {
    let config = args.resolve()?;

    let client = HttpServiceClient::new(&config.base_url, &config.transport)
        .context("failed to construct HTTP client")?;

    let report = Harness::new(config, Arc::new(client))
        .run()
        .await
        .context("load test failed")?;

    report.print_summary();
    Ok(report.exit_code())
}

/// Check a configuration file without running anything
pub fn validate(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    config.validate().context("invalid configuration")?;

    println!("Configuration is valid: {}", path.display());
    println!(
        "  {} workers x {} requests at {} req/s against {}",
        config.workers, config.requests_per_worker, config.rate_limit, config.base_url
    );
    println!(
        "  expected duration {:.1}s, run timeout {}s",
        config.expected_duration().as_secs_f64(),
        config.run_timeout().as_secs()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "shortener-bench",
            "run",
            "--base-url",
            "http://localhost:8080/api",
            "-w",
            "4",
            "-n",
            "50",
            "--rate-limit",
            "12.5",
            "--shape-base",
            "prefix",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.workers, 4);
        assert_eq!(config.requests_per_worker, 50);
        assert_eq!(config.rate_limit, 12.5);
        assert_eq!(config.shape_base, ShapeBase::Prefix);
        // Untouched fields keep their defaults
        assert_eq!(config.suffix_length, 6);
    }

    #[test]
    fn test_run_rejects_unknown_shape_base() {
        let result = Cli::try_parse_from(["shortener-bench", "run", "--shape-base", "middle"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_rejects_invalid_values() {
        let args = RunArgs {
            workers: Some(0),
            ..Default::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("workers"));
    }

    #[test]
    fn test_validate_requires_config() {
        let result = Cli::try_parse_from(["shortener-bench", "validate"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["shortener-bench", "-v", "validate", "-c", "bench.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Validate { .. }));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/shortener-bench.toml")),
            ..Default::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(format!("{err:#}").contains("failed to load config"));
    }
}
