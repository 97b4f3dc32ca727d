use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::errors::AppError;

const LOG_FILE_NAME: &str = "jira-3lo.log";

/// Set up application logging based on configuration
///
/// `RUST_LOG` wins over the configured level. Without a file path the log
/// goes to stderr so stdout stays reserved for command output.
pub fn setup_logging(config: &Config) -> Result<WorkerGuard, AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let (writer, guard) = match config.log_file_path() {
        Some(path) => create_file_logger(path)?,
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| AppError::Logging {
        reason: format!("Failed to set global tracing subscriber: {}", e),
    })?;

    Ok(guard)
}

// An explicit file is written as is; a bare directory gets a daily rotated log
fn create_file_logger(path: &str) -> Result<(NonBlocking, WorkerGuard), AppError> {
    let log_path = PathBuf::from(path);

    if log_path.is_dir() {
        let appender = RollingFileAppender::new(Rotation::DAILY, &log_path, LOG_FILE_NAME);
        return Ok(tracing_appender::non_blocking(appender));
    }

    let log_dir = match log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&log_dir).map_err(|e| AppError::Logging {
        reason: format!("Failed to create log directory {}: {}", log_dir.display(), e),
    })?;

    let file_name = log_path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new(LOG_FILE_NAME));
    let appender = tracing_appender::rolling::never(&log_dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn default_log_dir() -> Result<PathBuf, AppError> {
    let base = match dirs::data_local_dir() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| AppError::Logging {
            reason: format!("Current directory not accessible: {}", e),
        })?,
    };
    Ok(base.join("jira-3lo").join("logs"))
}
