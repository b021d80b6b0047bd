//! Connection sessions
//!
//! One [`Session`] runs per accepted connection:
//!
//! ```text
//! INIT -> SENDING <-> SLEEPING -> DONE
//!            |
//!            +-> DISCONNECTED
//! ```
//!
//! - INIT: response head, fixed startup delay, cursor at 0
//! - SENDING: ask the cursor for a batch, drop blank lines, write
//! - SLEEPING: log the batch and average bandwidth, sleep a sampled jitter
//!
//! The session owns its cursor, RNG and counters; the only shared state is
//! the read-only buffer and configuration.

use crate::buffer::LineBuffer;
use crate::distribution::GammaDistribution;
use crate::error::{is_disconnect, ReplayError};
use crate::server::response;
use crate::strategy::Strategy;
use crate::util::format::si_prefix;
use crate::util::time::{calculate_throughput, secs_to_duration};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Settings shared by every session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Batch strategy chosen at startup
    pub strategy: Strategy,
    /// Pause between the response head and the first batch
    pub delay: Duration,
    /// Seconds slept between batches
    pub jitter: GammaDistribution,
    /// Fixed RNG seed, if reproducible pacing is wanted
    pub seed: Option<u64>,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The whole buffer was delivered
    Completed { bytes: u64, batches: u64 },
    /// The client went away first
    Disconnected { bytes: u64, batches: u64 },
}

impl SessionOutcome {
    pub fn bytes(&self) -> u64 {
        match *self {
            SessionOutcome::Completed { bytes, .. } | SessionOutcome::Disconnected { bytes, .. } => {
                bytes
            }
        }
    }
}

/// Replay state for one connection
pub struct Session {
    peer: SocketAddr,
    config: Arc<SessionConfig>,
    buffer: Arc<LineBuffer>,
    rng: Xoshiro256PlusPlus,
    cumulative_bytes: u64,
    batches: u64,
}

impl Session {
    pub fn new(peer: SocketAddr, config: Arc<SessionConfig>, buffer: Arc<LineBuffer>) -> Self {
        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        Self {
            peer,
            config,
            buffer,
            rng,
            cumulative_bytes: 0,
            batches: 0,
        }
    }

    /// Stream the buffer to `writer` until it is exhausted or the peer leaves
    ///
    /// Write errors that mean the client disconnected end the session with
    /// [`SessionOutcome::Disconnected`]; any other IO error is returned.
    pub async fn run<W>(mut self, writer: &mut W) -> Result<SessionOutcome, ReplayError>
    where
        W: AsyncWrite + Unpin,
    {
        // INIT
        let head = response::ok_head();
        if let Err(e) = self.send(writer, head.as_bytes()).await {
            return self.disconnected_or(e);
        }

        if !self.config.delay.is_zero() {
            debug!("{} waiting {:.3} s before streaming", self.peer, self.config.delay.as_secs_f64());
            sleep(self.config.delay).await;
        }

        let session_start = Instant::now();
        let mut cursor = self.config.strategy.cursor(session_start.into_std());

        loop {
            // SENDING
            let now = Instant::now().into_std();
            let Some(batch) = cursor.next_batch(&self.buffer, now, &mut self.rng) else {
                info!(
                    "{} file sent ({} B), hanging up",
                    self.peer, self.cumulative_bytes
                );
                return Ok(SessionOutcome::Completed {
                    bytes: self.cumulative_bytes,
                    batches: self.batches,
                });
            };

            let lines: Vec<&str> = batch
                .iter()
                .filter(|r| !r.is_blank())
                .map(|r| r.text())
                .collect();

            let mut sent = 0;
            if !lines.is_empty() {
                let mut output = lines.join("\n");
                output.push('\n');

                if let Err(e) = self.send(writer, output.as_bytes()).await {
                    return self.disconnected_or(e);
                }
                sent = output.len();
                self.cumulative_bytes += sent as u64;
                self.batches += 1;
            }

            // SLEEPING
            let avg_bandwidth = calculate_throughput(self.cumulative_bytes, session_start.elapsed());
            let jitter = self.config.jitter.sample(&mut self.rng);
            info!(
                "{} sent {} lines ({} B, {}), sleeping {:.3} s",
                self.peer,
                lines.len(),
                sent,
                si_prefix(avg_bandwidth, "B/s"),
                jitter
            );
            sleep(secs_to_duration(jitter)).await;
        }
    }

    async fn send<W>(&self, writer: &mut W, bytes: &[u8]) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    fn disconnected_or(&self, err: io::Error) -> Result<SessionOutcome, ReplayError> {
        if is_disconnect(&err) {
            info!("{} has disconnected, hanging up", self.peer);
            Ok(SessionOutcome::Disconnected {
                bytes: self.cumulative_bytes,
                batches: self.batches,
            })
        } else {
            Err(err.into())
        }
    }
}
