//! Timing helpers

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Calculate throughput from bytes transferred and duration
///
/// Returns 0 when no time has elapsed yet.
pub fn calculate_throughput(bytes: u64, duration: Duration) -> f64 {
    let seconds = duration.as_secs_f64();
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}

/// Convert a fractional number of seconds into a `Duration`
///
/// Negative, NaN and infinite inputs collapse to zero; values too large for
/// a `Duration` saturate at `Duration::MAX`.
pub fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Format a timestamp as an HTTP `Date` header value (RFC 7231 IMF-fixdate)
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
