//! File logging. The terminal belongs to the UI, so nothing is written to stdout.

use crate::config::LoggingConfig;
use anyhow::Context as _;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Keep the guard alive until exit or buffered
/// lines are lost.
pub fn init(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("failed to create log directory {}", config.directory.display()))?;

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::default()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

/// `RUST_LOG` wins over the configured level.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
