// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, serving, shutdown.

use std::ffi::OsString;
use std::fs::File;
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use fs2::FileExt;
use librarian_core::SystemClock;
use librarian_storage::{Library, LibraryError};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::maintenance::{self, MaintenanceTask};
use crate::server::{self, AppState};

/// Address the HTTP server binds when none is given
pub const DEFAULT_HTTP_ADDRESS: &str = "localhost:8000";

/// How often the maintenance task checks for due jobs
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the librarian log
    pub log_path: PathBuf,
    /// Path to lock/PID file guarding the log
    pub lock_path: PathBuf,
    /// Address for the HTTP API and help page
    pub http_address: String,
    /// Where to copy the log every midnight
    pub backup_path: Option<PathBuf>,
    /// Reset every namespace at 2 AM
    pub daily_clear: bool,
    /// Debug-level logging
    pub verbose: bool,
}

impl Config {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        let log_path = log_path.into();
        Self {
            lock_path: lock_path_for(&log_path),
            log_path,
            http_address: DEFAULT_HTTP_ADDRESS.to_string(),
            backup_path: None,
            daily_clear: false,
            verbose: false,
        }
    }

    pub fn with_http_address(mut self, address: impl Into<String>) -> Self {
        self.http_address = address.into();
        self
    }

    pub fn with_backup(mut self, path: Option<PathBuf>) -> Self {
        self.backup_path = path;
        self
    }

    pub fn with_daily_clear(mut self, enabled: bool) -> Self {
        self.daily_clear = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }
}

/// `<log>.lock`, next to the log it guards
fn lock_path_for(log_path: &Path) -> PathBuf {
    let mut name = OsString::from(log_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    lock_file: File,
    /// HTTP listener
    pub listener: TcpListener,
    /// Reservation store shared with request handlers
    pub library: Arc<Library>,
}

impl DaemonState {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve HTTP until `shutdown` resolves, then clean up
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), LifecycleError> {
        let address = self.local_addr()?;

        let task = MaintenanceTask::new(SystemClock, Local)
            .with_backup(self.config.backup_path.clone())
            .with_daily_clear(self.config.daily_clear);
        let maintenance = if task.is_empty() {
            None
        } else {
            info!("Nightly maintenance enabled: {}", task.describe());
            Some(tokio::spawn(maintenance::run(
                task,
                Arc::clone(&self.library),
                MAINTENANCE_INTERVAL,
            )))
        };

        info!("Librarian server listening at {} ...", address);

        let app = server::build_router(AppState::new(
            Arc::clone(&self.library),
            self.config.http_address.clone(),
        ));
        let DaemonState {
            config,
            lock_file,
            listener,
            ..
        } = self;

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = maintenance {
            handle.abort();
        }
        shutdown_cleanup(&config, lock_file);
        served.map_err(LifecycleError::Serve)
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock on {0}: librarian already running on this log?")]
    LockFailed(PathBuf, #[source] std::io::Error),

    #[error("Failed to bind HTTP address {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Unable to open librarian log file: {0}")]
    Library(#[from] LibraryError),

    #[error("HTTP server error: {0}")]
    Serve(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // A lock we failed to take belongs to another instance
            if !matches!(e, LifecycleError::LockFailed(..)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create the log directory (needed for the lock file)
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // 2. Acquire lock file FIRST - one librarian per log
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(config.lock_path.clone(), e))?;

    // Write PID to lock file
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Replay the log BEFORE binding (don't accept requests with unknown state)
    let library = Library::open(&config.log_path, SystemClock)?;
    let stats = library.stats();
    info!(
        "Loaded state: {} namespaces, {} reservations",
        stats.namespaces, stats.reservations
    );

    // 4. Bind (LAST - only after all validation passes)
    let listener = TcpListener::bind(&config.http_address)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.http_address.clone(), e))?;

    info!("Librarian started on log {}", config.log_path.display());

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        library: Arc::new(library),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Remove the PID file; the lock itself is released when the file is dropped
fn shutdown_cleanup(config: &Config, lock_file: File) {
    if config.lock_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.lock_path) {
            warn!("Failed to remove lock file: {}", e);
        }
    }
    drop(lock_file);
    info!("Librarian shutdown complete");
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
