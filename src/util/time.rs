use chrono::{Local, NaiveDateTime};
use std::time::{Duration, Instant};

/// Format used for archived canvas file names: `YYYY-MM-DD_HHMMSS`
pub const ARCHIVE_STAMP_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Current local wall-clock time
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Stamp used to name archive files
pub fn archive_stamp(now: NaiveDateTime) -> String {
    now.format(ARCHIVE_STAMP_FORMAT).to_string()
}

/// ISO-8601 timestamp with second precision, e.g. `2024-10-05T11:22:33`
pub fn iso_timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Fires at most once per interval; used for autosave
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    last: Instant,
}

impl IntervalTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: now }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true (and restarts) when the interval has elapsed at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }
}
