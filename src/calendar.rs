//! Calendar arithmetic over wall-clock dates and times.
//!
//! Everything here is local time without a zone: a trip is planned in the
//! traveler's own calendar, and days are split at local midnight.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parse a `YYYY-MM-DD` string as a calendar date.
pub fn parse_date_iso(date_iso: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_iso.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(date_iso.to_string()))
}

pub fn format_date_iso(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse an `HH:MM` string as a time of day.
pub fn parse_time_hhmm(time_hhmm: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time_hhmm.trim(), TIME_FORMAT).map_err(|_| Error::InvalidTime(time_hhmm.to_string()))
}

pub fn format_time_hhmm(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Saturates at the ends of the representable calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Number of calendar days in `[start, end]`, or zero when `end < start`.
pub fn diff_days_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    let span = (end - start).num_days() + 1;
    usize::try_from(span.max(0)).unwrap_or(0)
}

/// Every date of the inclusive range, in order.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(diff_days_inclusive(start, end)).collect()
}

pub fn make_local_date_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` time.
pub fn parse_local_date_time(date_iso: &str, time_hhmm: &str) -> Result<NaiveDateTime> {
    Ok(make_local_date_time(parse_date_iso(date_iso)?, parse_time_hhmm(time_hhmm)?))
}

/// The first midnight strictly after `instant`.
pub fn next_midnight(instant: NaiveDateTime) -> NaiveDateTime {
    add_days(instant.date(), 1).and_time(NaiveTime::MIN)
}

/// Saturates at [`NaiveDateTime::MAX`].
pub fn add_seconds(instant: NaiveDateTime, seconds: u64) -> NaiveDateTime {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Saturates at [`NaiveDateTime::MIN`].
pub fn sub_seconds(instant: NaiveDateTime, seconds: u64) -> NaiveDateTime {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| instant.checked_sub_signed(delta))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Whole seconds from `from` to `to`, clamped at zero.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

/// Serde adapter for `HH:MM` times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}
