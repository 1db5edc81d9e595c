//! Date parsing and month/day labels.
//!
//! Upstream dates are loosely formatted strings. Everything is interpreted in
//! UTC so bucket keys do not shift with the viewer's timezone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// A date string that could not be interpreted.
///
/// Callers skip the offending record; this error is never surfaced further.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unparseable date: {input:?}")]
pub struct DateParseError {
    pub input: String,
}

/// Offset forms RFC 3339 rejects, such as minute precision.
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an upstream date string into a UTC instant.
///
/// Accepts RFC 3339 timestamps, minute-precision timestamps with `Z` or an
/// offset, naive date-times (taken as UTC) and bare `YYYY-MM-DD` dates (UTC
/// midnight).
pub fn parse_date(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateParseError {
            input: input.to_string(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DateParseError {
            input: input.to_string(),
        })
}

/// Parse an optional date field, treating absence as a parse failure.
pub fn parse_optional(input: Option<&str>) -> Result<DateTime<Utc>, DateParseError> {
    parse_date(input.unwrap_or_default())
}

/// Sortable month key, zero padded: `2024-03`.
pub fn month_key(date: &DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// `Mar 2024`
pub fn short_month_label(date: &DateTime<Utc>) -> String {
    date.format("%b %Y").to_string()
}

/// `March 2024`
pub fn long_month_label(date: &DateTime<Utc>) -> String {
    date.format("%B %Y").to_string()
}

/// `March 1, 2024`
pub fn long_date_label(date: &DateTime<Utc>) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// `Mar 1`
pub fn short_day_label(date: &DateTime<Utc>) -> String {
    format!("{} {}", date.format("%b"), date.day())
}
