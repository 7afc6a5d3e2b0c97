// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nightly maintenance: log backup and clearing all reservations
//!
//! Jobs are driven by an injectable clock. `tick` runs whatever is due and
//! schedules the next occurrence; the daemon calls it on a fixed interval.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use librarian_core::{Clock, DailySchedule};
use librarian_storage::Library;
use tracing::{info, warn};

/// Backups run at midnight
pub const BACKUP_SCHEDULE: (u32, u32) = (0, 0);

/// Clear-all runs at 2 AM
pub const CLEAR_SCHEDULE: (u32, u32) = (2, 0);

/// Work performed by the maintenance task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NightlyJob {
    /// Copy the log to the given path
    Backup { dest: PathBuf },
    /// Reset every namespace
    ClearAll,
}

impl fmt::Display for NightlyJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NightlyJob::Backup { dest } => write!(f, "backup to {}", dest.display()),
            NightlyJob::ClearAll => write!(f, "clear all checkouts"),
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledJob {
    job: NightlyJob,
    schedule: DailySchedule,
    next_run: DateTime<Utc>,
}

/// Background maintenance for the reservation store
pub struct MaintenanceTask<C: Clock, Tz: TimeZone> {
    clock: C,
    tz: Tz,
    jobs: Vec<ScheduledJob>,
}

impl<C: Clock, Tz: TimeZone> MaintenanceTask<C, Tz> {
    /// Create an empty task evaluating schedules in `tz`
    pub fn new(clock: C, tz: Tz) -> Self {
        Self {
            clock,
            tz,
            jobs: Vec::new(),
        }
    }

    /// Add a job, first due at its next occurrence after now
    pub fn with_job(mut self, job: NightlyJob, schedule: DailySchedule) -> Self {
        let next_run = schedule.next_after(self.clock.now(), &self.tz);
        self.jobs.push(ScheduledJob {
            job,
            schedule,
            next_run,
        });
        self
    }

    /// Add a midnight backup if a destination is configured
    pub fn with_backup(self, dest: Option<PathBuf>) -> Self {
        match dest {
            Some(dest) => {
                let (hour, minute) = BACKUP_SCHEDULE;
                self.with_job(NightlyJob::Backup { dest }, DailySchedule::at(hour, minute))
            }
            None => self,
        }
    }

    /// Add the 2 AM clear-all if enabled
    pub fn with_daily_clear(self, enabled: bool) -> Self {
        if enabled {
            let (hour, minute) = CLEAR_SCHEDULE;
            self.with_job(NightlyJob::ClearAll, DailySchedule::at(hour, minute))
        } else {
            self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Earliest pending run time
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.jobs.iter().map(|j| j.next_run).min()
    }

    /// Human-readable job list for startup logs
    pub fn describe(&self) -> String {
        self.jobs
            .iter()
            .map(|j| format!("{} ({})", j.job, j.schedule))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Run every job that is due and reschedule it
    ///
    /// Failures are logged; the job still moves to its next occurrence.
    /// Returns the jobs that ran, in schedule order.
    pub fn tick<LC: Clock>(&mut self, library: &Library<LC>) -> Vec<NightlyJob> {
        let now = self.clock.now();
        let mut ran = Vec::new();

        for scheduled in &mut self.jobs {
            if scheduled.next_run > now {
                continue;
            }

            run_job(&scheduled.job, library);
            scheduled.next_run = scheduled.schedule.next_after(now, &self.tz);
            ran.push(scheduled.job.clone());
        }

        ran
    }
}

fn run_job<LC: Clock>(job: &NightlyJob, library: &Library<LC>) {
    match job {
        NightlyJob::Backup { dest } => match library.backup(dest) {
            Ok(bytes) => info!("Backed up librarian log to {} ({} bytes)", dest.display(), bytes),
            Err(e) => warn!("Nightly backup to {} failed: {}", dest.display(), e),
        },
        NightlyJob::ClearAll => match library.clear_all() {
            Ok(count) => info!("Nightly clear reset {} namespaces", count),
            Err(e) => warn!("Nightly clear failed: {}", e),
        },
    }
}

/// Drive `task` every `period` until the returned future is dropped
pub async fn run<C, Tz, LC>(
    mut task: MaintenanceTask<C, Tz>,
    library: Arc<Library<LC>>,
    period: Duration,
) where
    C: Clock + 'static,
    Tz: TimeZone + Send + 'static,
    LC: Clock + 'static,
{
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;

        // Backups and resets fsync; keep them off the async workers
        let library = Arc::clone(&library);
        let result = tokio::task::spawn_blocking(move || {
            task.tick(&library);
            task
        })
        .await;

        task = match result {
            Ok(task) => task,
            Err(e) => {
                warn!("Maintenance task stopped: {}", e);
                return;
            }
        };
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
