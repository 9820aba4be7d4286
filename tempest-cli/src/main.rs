//! Binary crate for the `tempest` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and resolving settings
//! - Interactive configuration
//! - Human-friendly and JSON output formatting

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod cli;
mod configure;
mod current;
mod display;
mod errors;
mod forecast;
mod history;
mod output;
mod settings;
mod stations;
mod theme;
mod version;

/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

fn init_tracing() {
    let level = match std::env::var_os("TEMPEST_DEBUG") {
        Some(v) if !v.is_empty() => "debug",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tempest={level},tempest_core={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cmd = cli::Cli::parse();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match cmd.run(&cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if cancel.is_cancelled() || errors::is_cancelled(&err) => {
            eprintln!("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
