//! Formatting dates.

use std::fmt;
use chrono::{DateTime, Local};


/// Formats a local time as ISO 8601 with second precision and no offset.
///
/// This is the format of timestamps in both the log and the attendance
/// records, e.g., `2024-03-07T09:05:01`.
pub fn format_local_iso_date(date: DateTime<Local>) -> impl fmt::Display {
    date.format("%Y-%m-%dT%H:%M:%S")
}


//============ Tests =========================================================
