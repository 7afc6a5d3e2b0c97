// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serving and restart specs

use crate::prelude::*;

#[test]
fn help_page_is_served() {
    let ws = Workspace::empty();
    let server = ws.serve(&[]);

    let (status, body) = server.get("/");
    assert_eq!(status, 200);
    assert!(body.contains(&format!("running on {}", server.addr())), "{body}");
}

#[test]
fn checkouts_survive_a_crash() {
    let ws = Workspace::empty();

    let server = ws.serve(&[]);
    assert_eq!(server.put("/checkout/u1/10/alice").0, 200);
    assert_eq!(server.put("/checkout/u1/11/bob").0, 200);
    assert_eq!(server.put("/checkin/u1/11/bob").0, 200);
    assert_eq!(server.put("/checkout/u1/10/bob").0, 409);
    server.crash();

    let server = ws.serve(&[]);
    let (status, body) = server.get("/checkout/u1/10");
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"Label":10,"Client":"alice"}"#);
    assert_eq!(server.get("/state/u1").1, r#"[{"Label":10,"Client":"alice"}]"#);
    assert_eq!(server.put("/checkout/u1/10/bob").0, 409);
}

#[test]
fn mutations_are_logged_one_per_line() {
    let ws = Workspace::empty();
    let server = ws.serve(&[]);

    server.put("/checkout/u1/10/alice");
    server.put("/checkout/u1/10/alice");
    server.put("/checkin/u1/10/alice");
    server.put("/reset/u1");
    server.crash();

    let lines = ws.log_lines();
    assert_eq!(lines.len(), 4, "{lines:?}");

    let fields: Vec<Vec<&str>> = lines
        .iter()
        .map(|line| line.split_whitespace().collect())
        .collect();
    assert_eq!(fields[0][1..], ["u1", "checkout", "10", "alice"]);
    assert_eq!(fields[1][1..], ["u1", "checkout", "10", "alice"]);
    assert_eq!(fields[2][1..], ["u1", "checkin", "10", "alice"]);
    assert_eq!(fields[3][1..], ["u1", "reset", "0", "n/a"]);
    for entry in &fields {
        assert!(entry[0].ends_with('Z'), "{entry:?}");
    }
}

#[test]
fn existing_log_is_replayed() {
    let ws = Workspace::empty();
    ws.write_log(
        "2024-01-01T00:00:00Z u1 checkout 1 katzw\n\
         2024-01-01T00:00:01Z u1 checkout 2019 zhaot\n\
         2024-01-01T00:00:02Z u2 checkout 5 katzw\n\
         2024-01-01T00:00:03Z u2 reset 0 n/a\n",
    );

    let server = ws.serve(&[]);
    assert_eq!(
        server.get("/state/u1").1,
        r#"[{"Label":1,"Client":"katzw"},{"Label":2019,"Client":"zhaot"}]"#
    );
    assert_eq!(server.get("/uuids").1, r#"["u1"]"#);
    assert_eq!(server.get("/history/u2").0, 200);
}

#[test]
fn sigterm_shuts_down_cleanly() {
    let ws = Workspace::empty();
    let server = ws.serve(&["--dailyclear"]);
    assert!(ws.lock_path().exists());

    let status = server.terminate();
    assert!(status.success(), "{status}");
    assert!(!ws.lock_path().exists());
}
