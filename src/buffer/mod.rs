//! Shared line buffer
//!
//! The dataset is loaded once at startup into a [`LineBuffer`] and then only
//! ever read. Sessions receive it behind an `Arc` and slice it by index, so
//! no locking is involved once the server is accepting connections.

pub mod archive;
pub mod loader;
pub mod timestamp;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Date parse failures reported individually at warn level
const MAX_LOGGED_PARSE_FAILURES: usize = 10;

pub use loader::load;

/// One line of the dataset
///
/// The timestamp is only populated when the buffer was built for real-rate
/// replay, and stays `None` for lines whose leading field did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    text: String,
    timestamp: Option<DateTime<Utc>>,
}

impl LineRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(text: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Ordered, immutable collection of dataset lines
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    records: Vec<LineRecord>,
}

impl LineBuffer {
    /// Build a buffer in file order, trailing whitespace stripped
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = lines
            .into_iter()
            .map(|line| LineRecord::new(line.as_ref().trim_end()))
            .collect();

        Self { records }
    }

    /// Build a buffer for real-rate replay
    ///
    /// Every line's leading field is parsed as a timestamp, then the whole
    /// buffer is stable-sorted ascending. Lines without a usable timestamp
    /// sort as the Unix epoch, ahead of any modern record.
    pub fn with_timestamps<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut failures = 0usize;
        let mut records: Vec<LineRecord> = lines
            .into_iter()
            .map(|line| {
                let text = line.as_ref().trim_end();
                let timestamp = match timestamp::parse_leading_timestamp(text) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        failures += 1;
                        if failures <= MAX_LOGGED_PARSE_FAILURES {
                            warn!("parse_date({:?}): {}", text, e);
                        } else {
                            debug!("parse_date({:?}): {}", text, e);
                        }
                        None
                    }
                };
                LineRecord::with_timestamp(text, timestamp)
            })
            .collect();

        if failures > MAX_LOGGED_PARSE_FAILURES {
            warn!(
                "{} lines had no parseable date ({} not shown, see debug log)",
                failures,
                failures - MAX_LOGGED_PARSE_FAILURES
            );
        }

        // Untimed lines sort as epoch zero, so records dated before 1970 land
        // ahead of header rows and end the header run early
        records.sort_by_key(|r| r.timestamp.unwrap_or(DateTime::UNIX_EPOCH));

        Self { records }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&LineRecord> {
        self.records.get(index)
    }

    /// Size of the buffer joined with newlines, as it would be sent in one dump
    pub fn byte_len(&self) -> usize {
        let text: usize = self.records.iter().map(|r| r.text.len()).sum();
        text + self.records.len().saturating_sub(1)
    }

    /// Number of lines carrying a parsed timestamp
    pub fn timestamped_count(&self) -> usize {
        self.records.iter().filter(|r| r.timestamp.is_some()).count()
    }
}
