//! Date formats
//!
//! Harvesters may send `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ssZ`. The backend
//! sends RFC 3339 or `YYYY-MM-DD hh:mm:ss`. Everything leaving the service
//! uses second granularity in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Granularity advertised by Identify
pub const GRANULARITY: &str = "YYYY-MM-DDThh:mm:ssZ";

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DAY_FORMAT: &str = "%Y-%m-%d";

/// Which end of a date window a request argument describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    From,
    Until,
}

/// Parse a `from`/`until` argument
///
/// A bare day expands to the first second of the day for `from` and the
/// last second for `until`, so both bounds stay inclusive. Returns `None`
/// for any other format.
pub fn parse_request_date(value: &str, bound: Bound) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, SECONDS_FORMAT) {
        return Some(Utc.from_utc_datetime(&dt));
    }
    let day = NaiveDate::parse_from_str(value, DAY_FORMAT).ok()?;
    // Zero-padded days only
    if value.len() != 10 {
        return None;
    }
    let time = match bound {
        Bound::From => NaiveTime::MIN,
        Bound::Until => NaiveTime::from_hms_opt(23, 59, 59)?,
    };
    Some(Utc.from_utc_datetime(&day.and_time(time)))
}

/// Format a date at the service granularity
pub fn format_datestamp(date: &DateTime<Utc>) -> String {
    date.format(SECONDS_FORMAT).to_string()
}

/// Parse a date as the notification API writes it
pub fn parse_backend_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}
