//! Dump strategy: everything in one batch

use crate::buffer::LineRecord;

/// Return the rest of the buffer once, then report exhaustion
pub fn next_batch<'a>(records: &'a [LineRecord], position: &mut usize) -> Option<&'a [LineRecord]> {
    if *position >= records.len() {
        return None;
    }

    let batch = &records[*position..];
    *position = records.len();
    Some(batch)
}
