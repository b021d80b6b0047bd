//! Leading timestamp extraction
//!
//! Flow exports put the record time in the first column. The column is
//! separated by the first `,` if the line has one, else by the first tab.
//! Two encodings are understood:
//!
//! - Unix epoch seconds, integer or fractional (`1609459200`, `1609459200.25`)
//! - Date strings: RFC 3339, RFC 2822 and the common `YYYY-MM-DD HH:MM:SS`
//!   family; values without an offset are taken as UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Naive date-time layouts tried after RFC 3339 / RFC 2822
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("empty timestamp field")]
    Empty,

    #[error("epoch value out of range: {0}")]
    OutOfRange(String),

    #[error("unrecognized date format: {0:?}")]
    Unrecognized(String),
}

/// Return the first field of a CSV/TSV line
pub fn leading_field(line: &str) -> &str {
    let sep = if line.contains(',') { ',' } else { '\t' };
    line.split(sep).next().unwrap_or(line)
}

/// Parse the leading field of `line` into a UTC timestamp
pub fn parse_leading_timestamp(line: &str) -> Result<DateTime<Utc>, TimestampError> {
    parse_timestamp(leading_field(line))
}

/// Parse a single field as epoch seconds or a date string
pub fn parse_timestamp(field: &str) -> Result<DateTime<Utc>, TimestampError> {
    let field = field.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if field.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(secs) = field.parse::<f64>() {
        return from_epoch_secs(secs).ok_or_else(|| TimestampError::OutOfRange(field.to_string()));
    }

    parse_date_string(field).ok_or_else(|| TimestampError::Unrecognized(field.to_string()))
}

fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }

    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }

    DateTime::from_timestamp(whole as i64, nanos)
}

fn parse_date_string(field: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(field) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(field, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
