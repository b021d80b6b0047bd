//! Configuration validation

use super::*;
use anyhow::Result;
use tracing::warn;

/// Upper bound for the startup delay and mean jitter (one week)
pub const MAX_DELAY_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(&config.server)?;
    validate_pacing(&config.pacing)?;

    Ok(())
}

/// Validate listener settings
pub fn validate_server(server: &ServerConfig) -> Result<()> {
    if !server.delay.is_finite() || server.delay < 0.0 {
        anyhow::bail!("delay must be a non-negative number of seconds, got {}", server.delay);
    }

    if server.delay > MAX_DELAY_SECS {
        anyhow::bail!("delay must be at most {} seconds, got {}", MAX_DELAY_SECS, server.delay);
    }

    if server.port == 0 {
        warn!("port 0 binds an ephemeral port");
    }

    Ok(())
}

/// Validate distribution parameters
pub fn validate_pacing(pacing: &PacingConfig) -> Result<()> {
    pacing.batch_size.distribution("batch_size")?;
    pacing.jitter.distribution("jitter")?;

    if pacing.jitter.mean > MAX_DELAY_SECS || pacing.jitter.stdev > MAX_DELAY_SECS {
        anyhow::bail!(
            "jitter mean and stdev must be at most {} seconds, got mean={}, stdev={}",
            MAX_DELAY_SECS,
            pacing.jitter.mean,
            pacing.jitter.stdev
        );
    }

    if pacing.jitter.mean > 3600.0 {
        warn!(
            "mean jitter of {} s means roughly one batch per hour",
            pacing.jitter.mean
        );
    }

    Ok(())
}
