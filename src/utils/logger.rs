//! Logging initialization and configuration.
//!
//! Logs are written to files under the user's local data directory so they
//! never mix with the answer printed on stdout or the messages on stderr.
//! Log files are rotated daily.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show debug and higher level logs
//! - `RUST_LOG=info` - Show info and higher level logs (default)
//! - `RUST_LOG=warn` - Show warnings and errors only
//! - `RUST_LOG=error` - Show errors only

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config;

pub const LOG_FILE_PREFIX: &str = "clihelper.log";

/// Initialize the logging system.
///
/// Sets up a daily-rolling file, e.g. `logs/clihelper.log.2026-10-18`.
/// Returns the writer guard; keep it alive until the process exits so
/// buffered lines are flushed. `None` when no log directory is usable, in
/// which case the run continues without logs.
pub fn init_logging() -> Option<WorkerGuard> {
    let log_dir = config::log_dir()?;

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .with_line_number(true);

    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::debug!("Logging initialized - writing to {}", log_dir.display());
    Some(guard)
}
