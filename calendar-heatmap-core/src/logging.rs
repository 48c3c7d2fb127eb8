//! Logging for calendar-heatmap
//!
//! Two sinks share one subscriber:
//! - a daily rolling file under `$XDG_STATE_HOME/calendar-heatmap/`, filtered
//!   by `logging.level` or `RUST_LOG`
//! - stderr, filtered by `logging.console` (default `warn`), so a command line
//!   run surfaces problems with the dataset while stdout stays clean for the
//!   rendered output

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

const LOG_FILE_NAME: &str = "calendar-heatmap.log";

/// Initialize logging to the state directory and stderr.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    init_in(config, &Config::state_dir())
}

/// Initialize logging with log files in `log_dir`.
pub fn init_in(config: &LoggingConfig, log_dir: &Path) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .max_log_files(config.max_files.max(1))
        .build(log_dir)
        .map_err(|e| Error::Config(format!("failed to open log file in {:?}: {}", log_dir, e)))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(file_filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .with_filter(console_filter(&config.console)?);

    // Tests may mount several heatmaps in one process; the first subscriber wins.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        console = %config.console,
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

fn console_filter(level: &str) -> Result<LevelFilter> {
    level
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid logging.console level: {}", level)))
}

/// Route events to the test harness's captured output.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps the file writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Returns the log file path
pub fn log_file_path() -> PathBuf {
    Config::log_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_path() {
        let path = log_file_path();
        assert!(path.ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_console_filter_levels() {
        assert_eq!(console_filter("warn").unwrap(), LevelFilter::WARN);
        assert_eq!(console_filter(" OFF ").unwrap(), LevelFilter::OFF);
        assert!(matches!(console_filter("loud"), Err(Error::Config(_))));
    }

    #[test]
    fn test_init_creates_log_dir() {
        let temp = TempDir::new().unwrap();
        let log_dir = temp.path().join("state/calendar-heatmap");
        let config = LoggingConfig {
            console: "off".to_string(),
            ..LoggingConfig::default()
        };

        let guard = init_in(&config, &log_dir).unwrap();
        drop(guard);
        assert!(log_dir.is_dir());

        let bad = LoggingConfig {
            console: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_in(&bad, &log_dir).is_err());
    }
}
