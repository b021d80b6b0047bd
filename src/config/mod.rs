//! Configuration module
//!
//! Handles CLI argument parsing, the optional TOML configuration file and
//! validation. The resolved [`Config`] is turned into the runtime pieces the
//! server needs: a [`Strategy`] and a [`SessionConfig`].

pub mod cli;
pub mod toml;
pub mod validator;

use crate::distribution::{GammaDistribution, DEFAULT_BATCH_SIZE, DEFAULT_JITTER};
use crate::session::SessionConfig;
use crate::strategy::Strategy;
use crate::util::time::secs_to_duration;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Complete replay configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub mode: ReplayMode,
    /// Seed for the per-session RNGs (random if unset)
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Socket address to bind
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.ip, self.server.port)
    }

    /// Build the delivery strategy for the configured mode
    pub fn strategy(&self) -> Result<Strategy> {
        Ok(match self.mode {
            ReplayMode::Dump => Strategy::Dump,
            ReplayMode::RealRate => Strategy::RealRate,
            ReplayMode::Regular => Strategy::Regular {
                batch_size: self.pacing.batch_size.distribution("batch_size")?,
            },
        })
    }

    /// Build the settings shared by every connection session
    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            strategy: self.strategy()?,
            delay: secs_to_duration(self.server.delay),
            jitter: self.pacing.jitter.distribution("jitter")?,
            seed: self.seed,
        })
    }
}

/// Listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind on
    #[serde(default = "default_ip")]
    pub ip: IpAddr,
    /// Port to serve on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Delay in seconds before each stream starts
    #[serde(default)]
    pub delay: f64,
}

fn default_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
            delay: 0.0,
        }
    }
}

/// Batch size and jitter distributions
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lines per batch (regular mode)
    #[serde(default = "default_batch_size")]
    pub batch_size: Moments,
    /// Seconds between batches
    #[serde(default = "default_jitter")]
    pub jitter: Moments,
}

fn default_batch_size() -> Moments {
    Moments::from(DEFAULT_BATCH_SIZE)
}

fn default_jitter() -> Moments {
    Moments::from(DEFAULT_JITTER)
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            jitter: default_jitter(),
        }
    }
}

/// Mean and standard deviation of a gamma distribution
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub stdev: f64,
}

impl Moments {
    pub fn distribution(&self, name: &'static str) -> Result<GammaDistribution> {
        GammaDistribution::new(name, self.mean, self.stdev)
            .with_context(|| format!("Invalid pacing.{} settings", name))
    }
}

impl From<(f64, f64)> for Moments {
    fn from((mean, stdev): (f64, f64)) -> Self {
        Self { mean, stdev }
    }
}

/// Which batch strategy to serve with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplayMode {
    /// Whole file in one go
    Dump,
    /// Gamma-distributed batch sizes
    #[default]
    Regular,
    /// Paced by line timestamps
    RealRate,
}

impl fmt::Display for ReplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayMode::Dump => write!(f, "dump"),
            ReplayMode::Regular => write!(f, "regular"),
            ReplayMode::RealRate => write!(f, "real-rate"),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "flowreplay=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
