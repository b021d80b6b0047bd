//! Regular strategy: gamma-distributed batch sizes

use crate::buffer::LineRecord;
use crate::distribution::GammaDistribution;
use rand::Rng;

/// Slice a randomly sized batch from `position`
///
/// The sampled size may be zero (an empty batch) or run past the end of the
/// buffer (a short batch). The cursor is clamped at the end.
pub fn next_batch<'a, R: Rng + ?Sized>(
    records: &'a [LineRecord],
    position: &mut usize,
    batch_size: &GammaDistribution,
    rng: &mut R,
) -> Option<&'a [LineRecord]> {
    let size = batch_size.sample_count(rng);

    if *position >= records.len() {
        return None;
    }

    let end = position.saturating_add(size).min(records.len());
    let batch = &records[*position..end];
    *position = end;
    Some(batch)
}
