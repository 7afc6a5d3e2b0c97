// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn system_clock_does_not_go_backwards() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(std::time::Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 >= t1);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    clock.advance(Duration::seconds(60));
    let t2 = clock.now();
    assert_eq!(t2 - t1, Duration::seconds(60));
}

#[test]
fn fake_clock_can_be_set() {
    let clock = FakeClock::new();
    let target = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now(), target);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let clock2 = clock1.clone();
    clock2.advance(Duration::seconds(30));
    assert_eq!(
        clock1.now(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 30).unwrap()
    );
}
