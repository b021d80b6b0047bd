//! flowreplay CLI entry point

use anyhow::{Context, Result};
use flowreplay::config::cli::Cli;
use flowreplay::config::{toml as config_toml, validator, Config, LogFormat, LoggingConfig};
use flowreplay::server::{Concurrency, ReplayServer};
use flowreplay::session::SessionConfig;
use flowreplay::LineBuffer;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Parse CLI arguments; usage errors exit before any state is built
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = build_config(&cli)?;
    init_tracing(&config.logging);
    validator::validate_config(&config).context("Configuration validation failed")?;

    println!("flowreplay v{}", env!("CARGO_PKG_VERSION"));

    let session_config = config.session_config()?;
    info!("Mode: {}", session_config.strategy);

    let buffer = flowreplay::buffer::load(&cli.path, session_config.strategy.needs_timestamps())
        .with_context(|| format!("Failed to load {}", cli.path.display()))?;
    let buffer = Arc::new(buffer);

    let (runtime, concurrency) = build_runtime()?;
    runtime.block_on(serve(&cli, &config, session_config, buffer, concurrency))
}

/// Bind and serve until interrupted
async fn serve(
    cli: &Cli,
    config: &Config,
    session_config: SessionConfig,
    buffer: Arc<LineBuffer>,
    concurrency: Concurrency,
) -> Result<()> {
    let server = ReplayServer::bind(config.bind_addr(), session_config, buffer)
        .await?
        .with_concurrency(concurrency);
    let addr = server.local_addr()?;

    let delay = if config.server.delay > 0.0 {
        format!("with {} s delay ", config.server.delay)
    } else {
        String::new()
    };
    info!("Serving {} on http://{}/ {}...", cli.path.display(), addr, delay);

    tokio::select! {
        result = server.serve() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

/// Resolve the configuration file (if any) and apply CLI overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => config_toml::parse_toml_file(path)?,
        None => Config::default(),
    };

    Ok(config_toml::merge_cli_with_config(cli, base))
}

/// Multi-threaded runtime, or a single-threaded fallback serving one client at a time
fn build_runtime() -> Result<(tokio::runtime::Runtime, Concurrency)> {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => Ok((runtime, Concurrency::Concurrent)),
        Err(e) => {
            warn!(
                "No threading support ({}). You will only be able to stream to 1 client at a time.",
                e
            );
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;
            Ok((runtime, Concurrency::Serial))
        }
    }
}

/// Initialize tracing; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        LogFormat::Json => {
            registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
        }
        LogFormat::Text => {
            registry.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
    }
}
