//! Explicit query windows
//!
//! The metrics API takes a window as `start/end` with both ends in UTC.

use chrono::{DateTime, Days, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timestamp format used on both ends of a window
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimespanError {
    #[error("timespan must be 'start/end', got '{0}'")]
    Malformed(String),

    #[error("invalid timestamp '{0}' (expected {format})", format = TIMESTAMP_FORMAT)]
    InvalidTimestamp(String),

    #[error("timespan start {start} is after end {end}")]
    Reversed { start: String, end: String },
}

/// Closed query window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timespan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Timespan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TimespanError> {
        if start > end {
            return Err(TimespanError::Reversed {
                start: start.format(TIMESTAMP_FORMAT).to_string(),
                end: end.format(TIMESTAMP_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// From midnight at the start of the previous day up to `now`
    pub fn since_previous_day(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let start = Utc.from_utc_datetime(&yesterday.and_time(chrono::NaiveTime::MIN));
        Self { start, end: now }
    }
}

impl fmt::Display for Timespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimespanError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| TimespanError::InvalidTimestamp(s.to_string()))
}

impl FromStr for Timespan {
    type Err = TimespanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| TimespanError::Malformed(s.to_string()))?;
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }
}
