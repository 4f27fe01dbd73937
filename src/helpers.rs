//! Shared helpers for turning OpenWeatherMap Unix timestamps into labels.
//!
//! All conversions read the timestamp as UTC. No timezone shift is applied,
//! so the calendar day of a sample is the UTC day even when the forecast city
//! is far from Greenwich.

use chrono::{DateTime, Utc};

/// Convert a Unix timestamp (seconds) to a UTC datetime.
///
/// Returns `None` for timestamps outside chrono's representable range.
pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// ISO calendar date, e.g. "2024-01-15".
pub(crate) fn iso_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// English short weekday name, e.g. "Mon".
pub(crate) fn weekday_short(dt: DateTime<Utc>) -> String {
    dt.format("%a").to_string()
}

/// 12-hour clock label with two-digit hour, e.g. "03:00 PM".
pub(crate) fn time_label(dt: DateTime<Utc>) -> String {
    dt.format("%I:%M %p").to_string()
}
