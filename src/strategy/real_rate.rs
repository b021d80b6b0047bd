//! Real-rate strategy: replay at the pace of the embedded timestamps
//!
//! The first call skips over any leading lines without a timestamp (headers)
//! and pins the timestamp of the first real record as `first_date`. From then
//! on, a line is due once
//!
//! ```text
//! timestamp <= first_date + (now - session_start)
//! ```
//!
//! and each call returns every due line from the cursor onwards. The first
//! line that is not yet due stays put for the next call.

use crate::buffer::LineRecord;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Instant;
use tracing::{info, warn};

/// Where a real-rate cursor is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealRatePhase {
    /// No batch served yet
    Uninitialized { session_start: Instant },
    /// Reference point captured from the first timestamped line
    Primed {
        first_date: DateTime<Utc>,
        session_start: Instant,
    },
    /// Header skipping consumed the whole buffer; nothing left to pace
    Drained,
}

pub fn next_batch<'a>(
    records: &'a [LineRecord],
    position: &mut usize,
    phase: &mut RealRatePhase,
    now: Instant,
) -> Option<&'a [LineRecord]> {
    match *phase {
        RealRatePhase::Uninitialized { session_start } => {
            let start = *position;
            let rest = &records[start.min(records.len())..];

            let header_end = match rest.iter().position(|r| r.timestamp().is_some()) {
                Some(offset) => {
                    let end = start + offset;
                    // position() guarantees a timestamp here
                    if let Some(first_date) = records[end].timestamp() {
                        info!("first_date: {}", first_date);
                        *phase = RealRatePhase::Primed {
                            first_date,
                            session_start,
                        };
                    }
                    end
                }
                None => {
                    warn!("no timestamped line to pace against, sending buffer as headers");
                    *phase = RealRatePhase::Drained;
                    records.len()
                }
            };

            let batch = &records[start.min(header_end)..header_end];
            *position = header_end;
            Some(batch)
        }
        RealRatePhase::Primed {
            first_date,
            session_start,
        } => {
            if *position >= records.len() {
                return None;
            }

            let rest = &records[*position..];
            let elapsed = now.saturating_duration_since(session_start);
            let deadline = TimeDelta::from_std(elapsed)
                .ok()
                .and_then(|delta| first_date.checked_add_signed(delta));

            let due = match deadline {
                Some(deadline) => rest
                    .iter()
                    .take_while(|r| r.timestamp().map_or(true, |ts| ts <= deadline))
                    .count(),
                None => rest.len(),
            };

            let batch = &rest[..due];
            *position += due;
            Some(batch)
        }
        RealRatePhase::Drained => None,
    }
}
