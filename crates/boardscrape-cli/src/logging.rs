//! Tracing setup: console plus an append-mode log file.

use anyhow::{Context, Result};
use boardscrape_core::LoggingConfig;
use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Open the log file for appending, creating its directory if needed.
pub fn open_log_file(config: &LoggingConfig) -> Result<File> {
    fs::create_dir_all(&config.dir)
        .with_context(|| format!("failed to create log directory {}", config.dir.display()))?;

    let path = config.file_path();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global subscriber.
///
/// The console honours `RUST_LOG` and falls back to the configured level.
/// The file sink always uses its own level and never carries ANSI colours.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.console_level));
    let file_filter = EnvFilter::new(&config.file_level);
    let file = open_log_file(config)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_filter),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(file = %config.file_path().display(), "Logging initialised");
    Ok(())
}
