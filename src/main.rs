//! shortener-bench - Rate-limited load and correctness harness for URL shorteners

use std::process::ExitCode;

use clap::Parser;

mod cli;

/// Exit status for configuration and startup failures
const EXIT_STARTUP_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    tracing::info!("shortener-bench starting...");

    let result = match cli.command {
        cli::Commands::Run(args) => cli::run(args).await,
        cli::Commands::Validate { config } => cli::validate(&config).map(|()| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "shortener-bench failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}
