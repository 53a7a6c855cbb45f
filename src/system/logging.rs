//! Logging system initialization

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::{non_blocking::WorkerGuard, rolling};

use crate::config::{LoggingConfig, StaticConfig};

/// Initialize the global tracing subscriber from `[logging]`
///
/// The returned `WorkerGuard` must be kept alive for the lifetime of the
/// program so buffered log lines are flushed on exit.
pub fn init_logging(config: &StaticConfig) -> Result<WorkerGuard> {
    let logging = &config.logging;
    let to_console = logging.file.as_deref().is_none_or(str::is_empty);

    let writer = build_writer(logging)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&logging.level)
        .with_context(|| format!("invalid log level '{}'", logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    let installed = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

fn build_writer(logging: &LoggingConfig) -> Result<Box<dyn std::io::Write + Send + Sync>> {
    let Some(log_file) = logging.file.as_deref().filter(|f| !f.is_empty()) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if !logging.enable_rotation {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("failed to open log file {}", log_file))?;
        return Ok(Box::new(file));
    }

    // 按天滚动
    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let prefix = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("linkpulse.log")
        .trim_end_matches(".log");

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(logging.max_backups.max(1) as usize)
        .build(dir)
        .context("failed to create rolling log appender")?;
    Ok(Box::new(appender))
}
