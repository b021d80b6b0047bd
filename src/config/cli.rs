//! CLI argument parsing using clap

use super::LogFormat;
use crate::error::ReplayError;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// flowreplay - Replay a line-oriented dataset to HTTP clients
///
/// Every POST request receives the file back in paced batches.
#[derive(Parser, Debug)]
#[command(name = "flowreplay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to replay line-by-line (plain text, .gz, .tar or .tar.gz)
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Port to serve on [default: 8000]
    #[arg(value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind server on [default: 127.0.0.1]
    #[arg(long)]
    pub ip: Option<IpAddr>,

    /// Delay in secs before starting each stream [default: 0.0]
    #[arg(long)]
    pub delay: Option<f64>,

    /// Output entire file at once (cannot be used with --real)
    #[arg(long)]
    pub dump: bool,

    /// Output lines at the same rate as their timestamps (cannot be used with --dump)
    #[arg(long)]
    pub real: bool,

    /// TOML configuration file; command line flags take precedence
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for batch size and jitter sampling (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    // === Pacing Options ===
    /// Mean lines per batch [default: 40]
    #[arg(long)]
    pub batch_mean: Option<f64>,

    /// Standard deviation of lines per batch [default: 25]
    #[arg(long)]
    pub batch_stdev: Option<f64>,

    /// Mean delay between batches in seconds [default: 1.0]
    #[arg(long)]
    pub jitter_mean: Option<f64>,

    /// Standard deviation of delay between batches [default: 0.25]
    #[arg(long)]
    pub jitter_stdev: Option<f64>,

    // === Logging Options ===
    /// Log filter directive (RUST_LOG overrides) [default: info]
    #[arg(long, env = "FLOWREPLAY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.dump && self.real {
            return Err(ReplayError::Usage(
                "cannot use --dump & --real together".to_string(),
            ));
        }

        Ok(())
    }
}
