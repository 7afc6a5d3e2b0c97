// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Library: the reservation store
//!
//! Owns the reservation table and the log writer behind a single
//! reader/writer lock. Queries take the read lock. Mutations take the write
//! lock, validate against the table, append to the log, and only then apply
//! to the table, so the log is never behind the in-memory state.
//!
//! ## Startup
//!
//! ```text
//! librarian.log → LogReader → replay (apply, no append) → ReservationTable
//!                                                          ↓
//!                                LogWriter (append mode) ← Library
//! ```

use crate::entry::LogEntry;
use crate::reader::{LogReadError, LogReader};
use crate::writer::LogWriter;
use librarian_core::{
    CheckoutOutcome, ClientId, Clock, InvalidArgument, Label, Namespace, Operation, Reservation,
    ReservationTable, ReserveError, SystemClock,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Checkout of a label held by another client
    #[error("{0}")]
    Conflict(ReserveError),

    /// Checkin of a label that is not held by the requesting client
    #[error("{0}")]
    InvalidState(ReserveError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error("malformed librarian log at line {line}: {reason}")]
    MalformedHistory { line: u64, reason: String },

    #[error("librarian log {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl From<ReserveError> for LibraryError {
    fn from(err: ReserveError) -> Self {
        if err.is_invalid_state() {
            LibraryError::InvalidState(err)
        } else {
            LibraryError::Conflict(err)
        }
    }
}

impl LibraryError {
    fn io(path: &Path, source: io::Error) -> Self {
        LibraryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn read(path: &Path, err: LogReadError) -> Self {
        match err {
            LogReadError::Malformed { line, reason } => {
                LibraryError::MalformedHistory { line, reason }
            }
            LogReadError::Io(source) => LibraryError::io(path, source),
        }
    }
}

/// Counts reported after replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub namespaces: usize,
    pub reservations: usize,
}

struct LibraryInner {
    table: ReservationTable,
    writer: LogWriter,
}

/// Durable reservation store shared by all request handlers
pub struct Library<C: Clock = SystemClock> {
    log_path: PathBuf,
    clock: C,
    inner: RwLock<LibraryInner>,
}

impl Library<SystemClock> {
    /// Open the log at `path` using the system clock
    pub fn open_default(path: &Path) -> Result<Self, LibraryError> {
        Self::open(path, SystemClock)
    }
}

impl<C: Clock> Library<C> {
    /// Replay the log at `path` and open it for appending
    ///
    /// A missing log is created. Any malformed line aborts with
    /// `MalformedHistory`. Entries that would be refused at runtime (a
    /// conflicting checkout, a checkin by the wrong client) are applied
    /// anyway and logged, since the log is authoritative.
    pub fn open(path: &Path, clock: C) -> Result<Self, LibraryError> {
        let mut table = ReservationTable::new();
        let mut replayed: u64 = 0;

        let mut entries = LogReader::open(path)
            .entries()
            .map_err(|e| LibraryError::read(path, e))?;
        while let Some(result) = entries.next() {
            let entry = result.map_err(|e| LibraryError::read(path, e))?;
            if let Err(e) = table.check(&entry.operation) {
                warn!(
                    line = entries.line_number(),
                    error = %e,
                    "replaying entry that would be refused at runtime"
                );
            }
            table.apply(&entry.operation);
            replayed += 1;
        }

        let writer = LogWriter::open(path).map_err(|e| LibraryError::io(path, e))?;

        info!(
            path = %path.display(),
            entries = replayed,
            namespaces = table.namespaces().len(),
            reservations = table.len(),
            "replayed librarian log"
        );

        Ok(Self {
            log_path: path.to_path_buf(),
            clock,
            inner: RwLock::new(LibraryInner { table, writer }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, LibraryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LibraryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append `op` to the log, then apply it to the table
    ///
    /// Caller holds the write lock and has already validated `op`.
    fn commit(&self, inner: &mut LibraryInner, op: Operation) -> Result<(), LibraryError> {
        let entry = LogEntry::new(self.clock.now(), op);
        inner
            .writer
            .append(&entry)
            .map_err(|e| LibraryError::io(&self.log_path, e))?;
        inner.table.apply(&entry.operation);
        debug!(line = %entry.to_line(), "committed");
        Ok(())
    }

    /// Reserve `label` in `namespace` for `client`
    ///
    /// Re-checkout by the current holder succeeds and is logged like any
    /// other checkout; the table is unchanged.
    pub fn checkout(
        &self,
        namespace: &Namespace,
        label: Label,
        client: &ClientId,
    ) -> Result<CheckoutOutcome, LibraryError> {
        validate_tokens(namespace, Some(client))?;

        let mut inner = self.write();
        let outcome = inner.table.check_checkout(namespace, label, client)?;
        self.commit(
            &mut inner,
            Operation::Checkout {
                namespace: namespace.clone(),
                label,
                client: client.clone(),
            },
        )?;
        Ok(outcome)
    }

    /// Release `label` in `namespace`, which must be held by `client`
    pub fn checkin(
        &self,
        namespace: &Namespace,
        label: Label,
        client: &ClientId,
    ) -> Result<(), LibraryError> {
        validate_tokens(namespace, Some(client))?;

        let mut inner = self.write();
        inner.table.check_checkin(namespace, label, client)?;
        self.commit(
            &mut inner,
            Operation::Checkin {
                namespace: namespace.clone(),
                label,
                client: client.clone(),
            },
        )
    }

    /// Drop every reservation in `namespace`
    ///
    /// Always recorded, even when the namespace holds nothing.
    pub fn reset(&self, namespace: &Namespace) -> Result<(), LibraryError> {
        validate_tokens(namespace, None)?;

        let mut inner = self.write();
        self.commit(&mut inner, Operation::reset(namespace.clone()))
    }

    /// Reset every namespace currently in the table
    ///
    /// Runs under one write lock; returns the number of namespaces reset.
    pub fn clear_all(&self) -> Result<usize, LibraryError> {
        let mut inner = self.write();
        let namespaces = inner.table.namespaces();
        for namespace in &namespaces {
            self.commit(&mut inner, Operation::reset(namespace.clone()))?;
        }
        Ok(namespaces.len())
    }

    /// Client holding `label` in `namespace`, if any
    pub fn get_one(&self, namespace: &Namespace, label: Label) -> Option<ClientId> {
        self.read().table.get(namespace, label).cloned()
    }

    /// All active reservations in `namespace`; empty if none
    pub fn get_all(&self, namespace: &Namespace) -> Vec<Reservation> {
        self.read().table.get_all(namespace)
    }

    /// Namespaces present in the table
    pub fn list_namespaces(&self) -> Vec<Namespace> {
        self.read().table.namespaces()
    }

    /// Every logged operation for `namespace`, oldest first
    ///
    /// Scans the whole log. The read lock is held for the scan so no append
    /// can be observed half-written.
    pub fn history(&self, namespace: &Namespace) -> Result<Vec<LogEntry>, LibraryError> {
        let _guard = self.read();
        LogReader::open(&self.log_path)
            .history(namespace)
            .map_err(|e| LibraryError::read(&self.log_path, e))?
            .map(|result| result.map_err(|e| LibraryError::read(&self.log_path, e)))
            .collect()
    }

    /// Copy the log to `dest`, replacing it atomically
    ///
    /// Returns the number of bytes copied.
    pub fn backup(&self, dest: &Path) -> Result<u64, LibraryError> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| LibraryError::io(dest, e))?;
            }
        }
        let mut temp = dest.as_os_str().to_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let _guard = self.read();
        let bytes =
            std::fs::copy(&self.log_path, &temp).map_err(|e| LibraryError::io(&temp, e))?;
        if let Err(e) = std::fs::rename(&temp, dest) {
            let _ = std::fs::remove_file(&temp);
            return Err(LibraryError::io(dest, e));
        }
        Ok(bytes)
    }

    /// Copy of the current table
    pub fn snapshot(&self) -> ReservationTable {
        self.read().table.clone()
    }

    pub fn stats(&self) -> LibraryStats {
        let inner = self.read();
        LibraryStats {
            namespaces: inner.table.namespaces().len(),
            reservations: inner.table.len(),
        }
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Reject identifiers that could not be written as single log tokens
fn validate_tokens(namespace: &Namespace, client: Option<&ClientId>) -> Result<(), InvalidArgument> {
    Namespace::parse(namespace.as_str())?;
    if let Some(client) = client {
        ClientId::parse(client.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "library_tests.rs"]
mod tests;
