// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily time-of-day schedule for nightly maintenance

use chrono::{DateTime, Days, LocalResult, NaiveTime, TimeZone, Utc};
use std::fmt;

/// Fires once a day at a fixed wall-clock time in some timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    /// Schedule at `hour:minute`
    ///
    /// Each field is clamped on its own: an hour past 23 becomes 23 and a
    /// minute past 59 becomes 59, so `at(25, 10)` runs at 23:10.
    pub fn at(hour: u32, minute: u32) -> Self {
        let at = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or(NaiveTime::MIN);
        Self { at }
    }

    pub fn time(&self) -> NaiveTime {
        self.at
    }

    /// First occurrence strictly after `after`, evaluated as wall-clock time in `tz`
    pub fn next_after<Tz: TimeZone>(&self, after: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        let local = after.with_timezone(tz);
        let mut day = local.date_naive();
        // A DST gap can swallow the slot on a given day; bounded to avoid spinning
        for _ in 0..4 {
            let candidate = match tz.from_local_datetime(&day.and_time(self.at)) {
                LocalResult::Single(t) => Some(t),
                LocalResult::Ambiguous(earliest, _) => Some(earliest),
                LocalResult::None => None,
            };
            if let Some(candidate) = candidate {
                let candidate = candidate.with_timezone(&Utc);
                if candidate > after {
                    return candidate;
                }
            }
            day = match day.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        after + chrono::Duration::days(1)
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "daily at {}", self.at.format("%H:%M"))
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
