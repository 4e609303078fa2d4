mod cli;
mod commands;
mod error;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use swipe_core::{ServiceHub, SwipeConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::{status_exit_code, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = SwipeConfig::from_env()?;
    if let Some(ms) = cli.timeout_ms {
        config = config.with_call_timeout(Duration::from_millis(ms));
    }
    debug!(?config, "configuration loaded");

    let hub = ServiceHub::builder().with_config(config).build();
    let (endpoint, request) = commands::inbound(&cli.command);
    let outcome = hub.handle(endpoint, &request).await;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{rendered}");

    Ok(ExitCode::from(status_exit_code(outcome.status())))
}

/// Logs go to stderr so stdout carries only the outcome JSON.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
