//! Calendar-day helpers over epoch-millisecond timestamps.
//!
//! Day arithmetic always truncates both instants to local midnight first and
//! subtracts dates afterwards, so "due tomorrow at 08:00" seen at 23:00 today
//! is one day away rather than zero.

use chrono::{DateTime, NaiveDate, TimeZone};

/// Calendar day of `instant_ms` in `tz`.
///
/// Stored instants are range-checked when records are decoded; an
/// unrepresentable value here falls back to the epoch.
pub fn local_day<Tz: TimeZone>(instant_ms: i64, tz: &Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(instant_ms)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

/// Whole calendar days from `now_ms` to `due_ms`; negative once overdue.
pub fn days_until<Tz: TimeZone>(now_ms: i64, due_ms: i64, tz: &Tz) -> i64 {
    (local_day(due_ms, tz) - local_day(now_ms, tz)).num_days()
}

/// Epoch milliseconds of local midnight starting `day`.
pub fn start_of_day_ms<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> i64 {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.timestamp_millis())
        .unwrap_or_else(|| midnight.and_utc().timestamp_millis())
}
