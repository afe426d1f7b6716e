//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and runtime
//! construction shared by the command handlers.

use std::path::{Path, PathBuf};

use crate::error::CliError;
use sensorlink::config::ConfigFile;
use sensorlink::logging::{default_log_file, init_logging, LoggingGuard};
use sensorlink::service::SensorServiceConfig;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit config file; defaults to ~/.sensorlink/config.ini
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, debug_mode: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);

        // stdout carries protocol output, console logging goes to stderr
        let logging_guard = init_logging(&log_dir, &log_file, debug_mode, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Service configuration derived from the config file.
    pub fn service_config(&self) -> SensorServiceConfig {
        SensorServiceConfig::from(&self.config)
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("sensorlink v{}", sensorlink::VERSION);
        info!("sensorlink CLI: {} command", command);
    }

    /// Build the multi-threaded runtime the service runs on.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}

/// Load from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let log_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_file = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| default_log_file().to_string());
    (log_dir, log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, file) = split_log_path(Path::new("/var/log/sensorlink/service.log"));
        assert_eq!(dir, PathBuf::from("/var/log/sensorlink"));
        assert_eq!(file, "service.log");
    }

    #[test]
    fn test_split_bare_file_name() {
        let (dir, file) = split_log_path(Path::new("service.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "service.log");
    }

    #[test]
    fn test_load_explicit_missing_path_gives_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = load_config(Some(&temp_dir.path().join("absent.ini"))).unwrap();
        assert_eq!(config, ConfigFile::default());
    }
}
