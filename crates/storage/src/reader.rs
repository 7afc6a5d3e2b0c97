// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log reader for replay and history scans
//!
//! Entries are parsed lazily in file order. The first malformed line ends
//! iteration with an error; there is no tolerance for corrupt history.

use crate::entry::LogEntry;
use librarian_core::Namespace;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading log entries
#[derive(Debug, Error)]
pub enum LogReadError {
    #[error("malformed entry at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Read-only view of a log file
///
/// Each call to `entries` or `history` opens an independent handle, so
/// reading never contends with the append handle.
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    /// Create a reader; a missing file reads as empty
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Iterate over all entries, oldest first
    pub fn entries(&self) -> Result<LogEntryIter, LogReadError> {
        LogEntryIter::new(&self.path, None)
    }

    /// Iterate over the entries for one namespace, oldest first
    pub fn history(&self, namespace: &Namespace) -> Result<LogEntryIter, LogReadError> {
        LogEntryIter::new(&self.path, Some(namespace.clone()))
    }
}

/// Lazy iterator over log entries
///
/// Exhausted at EOF or after the first error; reopen to read again.
pub struct LogEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    namespace: Option<Namespace>,
}

impl LogEntryIter {
    fn new(path: &Path, namespace: Option<Namespace>) -> Result<Self, LogReadError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            namespace,
        })
    }

    /// Line number of the last line read (1-based)
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    fn fail(&mut self, error: LogReadError) -> Option<Result<LogEntry, LogReadError>> {
        self.reader = None;
        Some(Err(error))
    }
}

impl Iterator for LogEntryIter {
    type Item = Result<LogEntry, LogReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;

            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    self.line_number += 1;

                    if line.trim().is_empty() {
                        continue;
                    }

                    let entry = match LogEntry::from_line(&line) {
                        Ok(entry) => entry,
                        Err(e) => {
                            let line = self.line_number;
                            return self.fail(LogReadError::Malformed {
                                line,
                                reason: e.to_string(),
                            });
                        }
                    };

                    if let Some(namespace) = &self.namespace {
                        if entry.operation.namespace() != namespace {
                            continue;
                        }
                    }

                    return Some(Ok(entry));
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    self.line_number += 1;
                    let line = self.line_number;
                    return self.fail(LogReadError::Malformed {
                        line,
                        reason: "line is not valid UTF-8".to_string(),
                    });
                }
                Err(e) => return self.fail(LogReadError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
