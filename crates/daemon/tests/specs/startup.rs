// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup failure specs

use std::net::TcpListener;

use crate::prelude::*;

#[test]
fn malformed_log_refuses_to_start() {
    let ws = Workspace::empty();
    ws.write_log("2024-01-01T00:00:00Z u1 checkout 10 alice\nnot a log line\n");

    ws.librarian()
        .arg(ws.log_path())
        .fails()
        .stderr_has("malformed librarian log at line 2");

    assert!(!ws.lock_path().exists());
}

#[test]
fn unknown_operation_refuses_to_start() {
    let ws = Workspace::empty();
    ws.write_log("2024-01-01T00:00:00Z u1 borrow 10 alice\n");

    ws.librarian()
        .arg(ws.log_path())
        .fails()
        .stderr_has("unknown operation \"borrow\"");
}

#[test]
fn occupied_address_refuses_to_start() {
    let ws = Workspace::empty();
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap().to_string();

    ws.librarian()
        .args(&["--http", &addr])
        .arg(ws.log_path())
        .fails()
        .stderr_has("Failed to bind HTTP address");
}

#[test]
fn second_instance_on_same_log_refuses_to_start() {
    let ws = Workspace::empty();
    let first = ws.serve(&[]);

    ws.librarian()
        .args(&["--http", "127.0.0.1:0"])
        .arg(ws.log_path())
        .fails()
        .stderr_has("already running");

    // The running instance is unaffected
    assert_eq!(first.get("/uuids").0, 200);
    assert!(ws.lock_path().exists());
}
