use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};

/// Inclusive time range `[start, end]` used to filter snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window from explicit bounds
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            bail!("Start time {} is after end time {}", start, end);
        }
        Ok(Self { start, end })
    }

    /// Window covering the `days` days that end at `end`
    ///
    /// # Errors
    ///
    /// Returns an error if the start would fall before the earliest representable time.
    pub fn days_back(end: DateTime<Utc>, days: u32) -> Result<Self> {
        let Some(start) =
            Duration::try_days(i64::from(days)).and_then(|span| end.checked_sub_signed(span))
        else {
            bail!("Cannot go back {} days from {}", days, end);
        };
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}
