//! Logging system initialization
//!
//! This module provides functions to initialize the tracing/logging system
//! based on application configuration.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::errors::{IpGeoError, Result};

/// Initialize logging system based on configuration
///
/// Sets up file output, log rotation and formatting. Should be called only
/// once during startup, after the configuration has been loaded.
///
/// The returned `WorkerGuard` must be kept alive for the duration of the
/// program to ensure non-blocking log writes are flushed.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| IpGeoError::logging(format!("invalid log level '{}': {}", config.level, e)))?;

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(log_file(config).is_none());

    let result = if config.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    result.map_err(|e| IpGeoError::logging(e.to_string()))?;

    Ok(guard)
}

fn log_file(config: &LoggingConfig) -> Option<&str> {
    config.file.as_deref().filter(|f| !f.is_empty())
}

fn build_writer(config: &LoggingConfig) -> Result<Box<dyn std::io::Write + Send + Sync>> {
    let Some(log_file) = log_file(config) else {
        return Ok(Box::new(std::io::stdout()));
    };

    if config.enable_rotation {
        let path = Path::new(log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("ipgeo.log");

        let appender = rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
            .map_err(|e| {
                IpGeoError::logging(format!("failed to create rolling log appender: {}", e))
            })?;
        Ok(Box::new(appender))
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| IpGeoError::logging(format!("failed to open log file {}: {}", log_file, e)))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_writer_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipgeo.log");
        let config = LoggingConfig {
            file: Some(path.to_str().unwrap().to_string()),
            enable_rotation: false,
            ..LoggingConfig::default()
        };
        build_writer(&config).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_file_name_means_stdout() {
        let config = LoggingConfig {
            file: Some(String::new()),
            ..LoggingConfig::default()
        };
        assert!(log_file(&config).is_none());
        build_writer(&config).unwrap();
    }
}
