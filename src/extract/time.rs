//! Calendar breakdown of event timestamps.
//!
//! Timestamps are interpreted as UTC. `week` is the ISO-8601 week number and
//! `weekday` counts from Monday = 0.

use super::ExtractError;
use crate::warehouse::TimeRow;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Rendering of `start_time` shared by the time and songplays tables.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn start_time_from_millis(ts: i64) -> Result<DateTime<Utc>, ExtractError> {
    DateTime::from_timestamp_millis(ts).ok_or(ExtractError::TimestampOutOfRange(ts))
}

pub fn format_start_time(start_time: &DateTime<Utc>) -> String {
    start_time.format(START_TIME_FORMAT).to_string()
}

pub fn time_row(start_time: &DateTime<Utc>) -> TimeRow {
    TimeRow {
        start_time: format_start_time(start_time),
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().num_days_from_monday(),
    }
}
