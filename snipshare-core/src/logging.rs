//! Logging infrastructure for snipshare
//!
//! Logs are written to `~/.local/state/snipshare/snipshare.log.<YYYY-MM-DD>`
//! following XDG standards, one file per UTC day.
//! The CLI renders to the terminal, so nothing is logged to stdout.

use crate::config::{Config, LoggingConfig};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// File name prefix; the appender adds `.<YYYY-MM-DD>`.
pub const LOG_FILE_PREFIX: &str = "snipshare.log";

/// Initialize the logging system
///
/// Sets up tracing with:
/// - File output to XDG state directory
/// - Log rotation
/// - Configurable log level via config or RUST_LOG env var
pub fn init(config: &LoggingConfig) -> crate::error::Result<LoggingGuard> {
    let log_dir = Config::state_dir();

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation, pruned to the configured number of files
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| crate::error::Error::Config(format!("failed to create log appender: {}", e)))?;

    // Non-blocking writer for better performance
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Build the filter from config or env var
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // File layer - structured logging with timestamps
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // Initialize the subscriber
    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Initialize logging for tests (logs to stdout)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any pending log writes.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Returns the file today's log lines go to
pub fn log_file_path() -> PathBuf {
    log_file_path_on(Utc::now().date_naive())
}

fn log_file_path_on(date: NaiveDate) -> PathBuf {
    Config::state_dir().join(format!("{}.{}", LOG_FILE_PREFIX, date.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let path = log_file_path_on(date);
        assert!(path.ends_with("snipshare.log.2024-03-09"));
        assert_eq!(path.parent(), Some(Config::state_dir().as_path()));

        let today = log_file_path();
        let name = today.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("snipshare.log."));
    }
}
