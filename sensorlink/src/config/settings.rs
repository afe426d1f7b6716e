//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::location::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};
use crate::night_mode::DEFAULT_NIGHT_MODE_MARKER;
use crate::service::{ScaleRounding, DEFAULT_POLL_INTERVAL};

use super::file::config_directory;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "sensorlink.log";

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Location daemon connection
    pub gpsd: GpsdSettings,
    /// Day/night marker
    pub night_mode: NightModeSettings,
    /// Poll timing
    pub polling: PollingSettings,
    /// Wire value encoding
    pub encoding: EncodingSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Location daemon configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsdSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
}

impl Default for GpsdSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_GPSD_HOST.to_string(),
            port: DEFAULT_GPSD_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Night mode configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NightModeSettings {
    /// Marker file whose presence means night
    pub marker: PathBuf,
}

impl Default for NightModeSettings {
    fn default() -> Self {
        Self {
            marker: PathBuf::from(DEFAULT_NIGHT_MODE_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    pub interval: Duration,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingSettings {
    pub rounding: ScaleRounding,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE),
        }
    }
}
