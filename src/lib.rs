//! flowreplay - Paced replay of line-oriented traffic datasets over HTTP
//!
//! flowreplay loads a dataset (flow records exported as CSV/TSV, logs, any
//! line-oriented text) into memory once and streams it back to every client
//! that POSTs to the server, batch by batch, with gamma-distributed batch
//! sizes and inter-batch jitter.
//!
//! # Architecture
//!
//! - **Line buffer**: loaded once at startup, shared read-only by all sessions
//! - **Batch strategies**: dump, regular (randomized), real-rate (timestamp paced)
//! - **Sessions**: one per connection, each with its own cursor and RNG
//! - **Server**: minimal HTTP/1.0 streaming responder on tokio

pub mod buffer;
pub mod config;
pub mod distribution;
pub mod error;
pub mod server;
pub mod session;
pub mod strategy;
pub mod util;

// Re-export commonly used types
pub use buffer::{LineBuffer, LineRecord};
pub use config::Config;
pub use error::ReplayError;
pub use strategy::Strategy;

/// Result type used throughout flowreplay
pub type Result<T> = anyhow::Result<T>;
