//! Batch strategies
//!
//! A [`Strategy`] is chosen once at startup and shared by every connection.
//! Each connection turns it into its own [`BatchCursor`], which walks the
//! shared [`LineBuffer`] and hands out contiguous slices of it.
//!
//! # Strategies
//!
//! - **Dump**: the whole buffer in one batch
//! - **Regular**: gamma-distributed batch sizes
//! - **RealRate**: as many lines as their timestamps say should have arrived
//!   by now, relative to when the session started
//!
//! Cursors only ever move forward by exactly the number of lines returned,
//! so concatenating every batch of a session reproduces the buffer.

pub mod dump;
pub mod real_rate;
pub mod regular;

use crate::buffer::{LineBuffer, LineRecord};
use crate::distribution::GammaDistribution;
use rand::Rng;
use std::fmt;
use std::time::Instant;

pub use real_rate::RealRatePhase;

/// Delivery strategy, selected once per process
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Send everything at once
    Dump,
    /// Randomized batch sizes
    Regular { batch_size: GammaDistribution },
    /// Timestamp-paced replay
    RealRate,
}

impl Strategy {
    /// Create the per-connection cursor for this strategy
    pub fn cursor(&self, session_start: Instant) -> BatchCursor {
        let state = match *self {
            Strategy::Dump => CursorState::Dump,
            Strategy::Regular { batch_size } => CursorState::Regular { batch_size },
            Strategy::RealRate => {
                CursorState::RealRate(RealRatePhase::Uninitialized { session_start })
            }
        };

        BatchCursor { position: 0, state }
    }

    /// Whether the buffer must carry parsed timestamps
    pub fn needs_timestamps(&self) -> bool {
        matches!(self, Strategy::RealRate)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Dump => write!(f, "dump"),
            Strategy::Regular { batch_size } => write!(
                f,
                "regular (batch size mean={}, stdev={})",
                batch_size.mean(),
                batch_size.stdev()
            ),
            Strategy::RealRate => write!(f, "real-rate"),
        }
    }
}

#[derive(Debug, Clone)]
enum CursorState {
    Dump,
    Regular { batch_size: GammaDistribution },
    RealRate(RealRatePhase),
}

/// Per-connection position in the shared buffer
#[derive(Debug, Clone)]
pub struct BatchCursor {
    position: usize,
    state: CursorState,
}

impl BatchCursor {
    /// Produce the next batch, or `None` once the buffer is exhausted
    ///
    /// `now` drives real-rate pacing and is ignored by the other strategies;
    /// `rng` is only consumed by the regular strategy.
    pub fn next_batch<'a, R: Rng + ?Sized>(
        &mut self,
        buffer: &'a LineBuffer,
        now: Instant,
        rng: &mut R,
    ) -> Option<&'a [LineRecord]> {
        let records = buffer.records();

        match &mut self.state {
            CursorState::Dump => dump::next_batch(records, &mut self.position),
            CursorState::Regular { batch_size } => {
                regular::next_batch(records, &mut self.position, batch_size, rng)
            }
            CursorState::RealRate(phase) => {
                real_rate::next_batch(records, &mut self.position, phase, now)
            }
        }
    }

    /// Index of the next undelivered line
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Real-rate phase, if this is a real-rate cursor
    pub fn real_rate_phase(&self) -> Option<&RealRatePhase> {
        match &self.state {
            CursorState::RealRate(phase) => Some(phase),
            _ => None,
        }
    }
}
