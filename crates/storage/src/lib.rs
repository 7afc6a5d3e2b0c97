// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! librarian-storage: durable reservation store
//!
//! The librarian log is the source of truth; the reservation table is
//! rebuilt by replaying it at startup.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entry;
pub mod library;
pub mod reader;
pub mod writer;

pub use entry::{EntryParseError, LogEntry};
pub use library::{Library, LibraryError, LibraryStats};
pub use reader::{LogEntryIter, LogReadError, LogReader};
pub use writer::LogWriter;
