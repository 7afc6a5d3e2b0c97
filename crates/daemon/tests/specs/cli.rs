// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line specs

use crate::prelude::*;

#[test]
fn help_lists_every_flag() {
    Workspace::empty()
        .librarian()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage: librarian")
        .stdout_has("--http <ADDR>")
        .stdout_has("--backup <PATH>")
        .stdout_has("--dailyclear")
        .stdout_has("--verbose");
}

#[test]
fn help_shows_default_address() {
    Workspace::empty()
        .librarian()
        .args(&["--help"])
        .passes()
        .stdout_has("localhost:8000");
}

#[test]
fn version_is_reported() {
    Workspace::empty()
        .librarian()
        .args(&["--version"])
        .passes()
        .stdout_has("librarian");
}

#[test]
fn log_file_is_required() {
    Workspace::empty()
        .librarian()
        .fails()
        .stderr_has("<LOG_FILE>");
}

#[test]
fn unknown_flag_is_rejected() {
    Workspace::empty()
        .librarian()
        .args(&["--bogus", "librarian.log"])
        .fails()
        .stderr_has("unexpected argument '--bogus'");
}
