//! The reduced cron schedule.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use thiserror::Error;
use tracing::warn;

/// A daily time-of-day schedule parsed from the five-field cron form.
///
/// Only minute and hour are honored. The remaining three fields must be
/// present for the string to parse, and anything other than `*` in them
/// is logged as ignored at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSchedule {
    minute: u32,
    hour: u32,
}

/// A schedule string the purger cannot use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The string does not have exactly five whitespace-separated fields.
    #[error("schedule must have 5 fields (minute hour dom month dow), got {0}")]
    WrongFieldCount(usize),

    /// The minute field is not a number in 0..=59.
    #[error("invalid minute field {0:?}: expected a number in 0..=59")]
    InvalidMinute(String),

    /// The hour field is not a number in 0..=23.
    #[error("invalid hour field {0:?}: expected a number in 0..=23")]
    InvalidHour(String),
}

impl PurgeSchedule {
    /// Parses the reduced cron form, e.g. `"0 3 * * *"` for 03:00 UTC.
    pub fn parse(schedule: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = schedule.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::WrongFieldCount(fields.len()));
        }

        let minute: u32 = fields[0]
            .parse()
            .ok()
            .filter(|m| *m <= 59)
            .ok_or_else(|| ScheduleError::InvalidMinute(fields[0].to_string()))?;
        let hour: u32 = fields[1]
            .parse()
            .ok()
            .filter(|h| *h <= 23)
            .ok_or_else(|| ScheduleError::InvalidHour(fields[1].to_string()))?;

        for (field, name) in fields[2..]
            .iter()
            .zip(["day-of-month", "month", "day-of-week"])
        {
            if *field != "*" {
                warn!(
                    field = name,
                    value = *field,
                    "schedule field is ignored; the purge runs every day at the configured time"
                );
            }
        }

        Ok(Self { minute, hour })
    }

    /// Scheduled minute, 0..=59.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Scheduled hour, 0..=23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Whether a purge should run now.
    ///
    /// True once the current UTC time reaches the scheduled hour and
    /// minute, unless a purge already ran on this calendar day. The
    /// at-or-past comparison makes the check robust against coarse wakeup
    /// cadences: a loop that wakes hourly still triggers the 03:00 purge
    /// at its first wakeup after 03:00.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, last_run: Option<NaiveDate>) -> bool {
        if last_run == Some(now.date_naive()) {
            return false;
        }
        let minute_of_day = now.hour() * 60 + now.minute();
        minute_of_day >= self.hour * 60 + self.minute
    }
}
