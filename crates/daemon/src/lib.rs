// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Librarian daemon
//!
//! Owns the log lock, serves the HTTP API over a shared [`librarian_storage::Library`]
//! and runs the nightly backup and clear jobs.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod lifecycle;
pub mod maintenance;
pub mod server;

pub use lifecycle::{startup, Config, DaemonState, LifecycleError, DEFAULT_HTTP_ADDRESS};
pub use server::{build_router, AppState};
