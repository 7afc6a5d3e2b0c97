// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use librarian_core::Operation;

fn entry(secs: u32, op: Operation) -> LogEntry {
    LogEntry::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, secs).unwrap(), op)
}

#[test]
fn creates_missing_file_and_parents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("librarian.log");

    let writer = LogWriter::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(writer.entries_written(), 0);
}

#[test]
fn appends_one_line_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("librarian.log");

    let mut writer = LogWriter::open(&path).unwrap();
    writer.append(&entry(1, Operation::checkout("u1", 10, "alice"))).unwrap();
    writer.append(&entry(2, Operation::reset("u1"))).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "2024-01-01T00:00:01Z u1 checkout 10 alice\n2024-01-01T00:00:02Z u1 reset 0 n/a\n"
    );
    assert_eq!(writer.entries_written(), 2);
}

#[test]
fn reopening_preserves_existing_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("librarian.log");

    {
        let mut writer = LogWriter::open(&path).unwrap();
        writer.append(&entry(1, Operation::checkout("u1", 10, "alice"))).unwrap();
    }
    {
        let mut writer = LogWriter::open(&path).unwrap();
        writer.append(&entry(2, Operation::checkin("u1", 10, "alice"))).unwrap();
        assert_eq!(writer.entries_written(), 1);
    }

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn missing_final_newline_is_restored_before_appending() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("librarian.log");
    std::fs::write(&path, "2024-01-01T00:00:00Z u1 checkout 10 alice").unwrap();

    let mut writer = LogWriter::open(&path).unwrap();
    writer.append(&entry(1, Operation::checkout("u1", 11, "bob"))).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "2024-01-01T00:00:00Z u1 checkout 10 alice\n2024-01-01T00:00:01Z u1 checkout 11 bob\n"
    );
}

#[test]
fn open_leaves_terminated_log_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("librarian.log");
    std::fs::write(&path, "2024-01-01T00:00:00Z u1 reset 0 n/a\n").unwrap();

    LogWriter::open(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "2024-01-01T00:00:00Z u1 reset 0 n/a\n");
}

#[test]
fn failed_append_leaves_log_on_a_line_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("librarian.log");

    let mut writer = LogWriter::open(&path).unwrap();
    writer.append(&entry(1, Operation::checkout("u1", 10, "alice"))).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    // A read-only handle makes the write fail
    writer.file = File::open(&path).unwrap();
    assert!(writer.append(&entry(2, Operation::reset("u1"))).is_err());
    assert_eq!(writer.entries_written(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

    let mut writer = LogWriter::open(&path).unwrap();
    writer.append(&entry(3, Operation::reset("u1"))).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.ends_with("u1 reset 0 n/a\n"));
}

#[test]
fn write_failure_is_reported() {
    let mut writer = LogWriter::open(Path::new("/dev/full")).unwrap();

    let err = writer
        .append(&entry(1, Operation::checkout("u1", 10, "alice")))
        .unwrap_err();

    assert_eq!(err.raw_os_error(), Some(28)); // ENOSPC
    assert_eq!(writer.entries_written(), 0);
}
