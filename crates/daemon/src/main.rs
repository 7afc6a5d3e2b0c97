// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Librarian server (librarian)
//!
//! Grants exclusive checkouts of labels within a UUID to named clients and
//! records every change in an append-only log.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use librarian_daemon::{lifecycle, Config, DEFAULT_HTTP_ADDRESS};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "librarian",
    version,
    about = "Coordinates label checkouts among clients, recording them in a log file"
)]
struct Args {
    /// Librarian log file; replayed at startup, appended to on every change
    log_file: PathBuf,

    /// Address for the HTTP API
    #[arg(long = "http", value_name = "ADDR", default_value = DEFAULT_HTTP_ADDRESS)]
    http: String,

    /// Copy the log to this path every midnight
    #[arg(long, value_name = "PATH")]
    backup: Option<PathBuf>,

    /// Check in every label at 2 AM
    #[arg(long = "dailyclear")]
    daily_clear: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config::new(self.log_file)
            .with_http_address(self.http)
            .with_backup(self.backup)
            .with_daily_clear(self.daily_clear)
            .with_verbose(self.verbose)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config();

    // Set up logging
    let _log_guard = setup_logging(config.verbose)?;

    info!("Starting librarian on log {}", config.log_path.display());

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start librarian: {}", e);
            return Err(e.into());
        }
    };

    let shutdown = shutdown_signal()?;
    daemon.run(shutdown).await?;

    info!("Librarian stopped");
    Ok(())
}

/// Resolves on the first SIGTERM or SIGINT
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()> + Send + 'static> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
    })
}

fn setup_logging(verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
