//! TOML configuration file parsing
//!
//! ```toml
//! mode = "real-rate"
//! seed = 42
//!
//! [server]
//! ip = "0.0.0.0"
//! port = 9000
//! delay = 2.5
//!
//! [pacing]
//! batch_size = { mean = 40, stdev = 25 }
//! jitter = { mean = 1.0, stdev = 0.25 }
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(ip) = cli.ip {
        config.server.ip = ip;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(delay) = cli.delay {
        config.server.delay = delay;
    }

    if cli.dump {
        config.mode = ReplayMode::Dump;
    } else if cli.real {
        config.mode = ReplayMode::RealRate;
    }

    if let Some(mean) = cli.batch_mean {
        config.pacing.batch_size.mean = mean;
    }
    if let Some(stdev) = cli.batch_stdev {
        config.pacing.batch_size.stdev = stdev;
    }
    if let Some(mean) = cli.jitter_mean {
        config.pacing.jitter.mean = mean;
    }
    if let Some(stdev) = cli.jitter_stdev {
        config.pacing.jitter.stdev = stdev;
    }

    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_full_file() {
        let config = parse_toml_string(
            r#"
            mode = "real-rate"
            seed = 42

            [server]
            ip = "0.0.0.0"
            port = 9000
            delay = 2.5

            [pacing]
            batch_size = { mean = 10.0, stdev = 2.0 }
            jitter = { mean = 0.5, stdev = 0.1 }

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, ReplayMode::RealRate);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.server.delay, 2.5);
        assert_eq!(config.pacing.batch_size, Moments { mean: 10.0, stdev: 2.0 });
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_empty_file_uses_defaults() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.mode, ReplayMode::Regular);
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(parse_toml_string("mode = \"turbo\"").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse_toml_string("mode = \"dump\"\n[server]\nport = 9000\ndelay = 1.0").unwrap();
        let cli = Cli::parse_from(["flowreplay", "flows.csv", "7000", "--real", "--seed", "9"]);

        let config = merge_cli_with_config(&cli, file);
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.delay, 1.0);
        assert_eq!(config.mode, ReplayMode::RealRate);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_file_values_survive_without_cli_flags() {
        let file = parse_toml_string("mode = \"dump\"").unwrap();
        let cli = Cli::parse_from(["flowreplay", "flows.csv"]);

        let config = merge_cli_with_config(&cli, file);
        assert_eq!(config.mode, ReplayMode::Dump);
        assert_eq!(config.server.port, 8000);
    }
}
