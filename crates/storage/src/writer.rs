// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log writer for durable append operations
//!
//! The writer only ever appends. Each entry is synced to disk before
//! `append` returns, and a failed append is truncated away so the log
//! always ends on a line boundary.

use crate::entry::LogEntry;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::warn;

/// Append-only writer for the librarian log
pub struct LogWriter {
    file: File,
    entries_written: u64,
}

impl LogWriter {
    /// Open or create a log file for appending
    pub fn open(path: &Path) -> io::Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        terminate_last_line(&mut file)?;

        Ok(Self {
            file,
            entries_written: 0,
        })
    }

    /// Append an entry to the log
    ///
    /// The entry is durably persisted before this method returns.
    pub fn append(&mut self, entry: &LogEntry) -> io::Result<()> {
        let mut line = entry.to_line();
        line.push('\n');

        let len = self.file.metadata()?.len();
        if let Err(e) = self.write_synced(line.as_bytes()) {
            if let Err(truncate) = self.file.set_len(len) {
                warn!("Failed to roll back partial log append: {}", truncate);
            }
            return Err(e);
        }

        self.entries_written += 1;
        Ok(())
    }

    fn write_synced(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.sync_data()
    }

    /// Number of entries appended since open
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }
}

/// Add the newline missing from a hand-edited or truncated last line
fn terminate_last_line(file: &mut File) -> io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
        file.sync_data()?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
