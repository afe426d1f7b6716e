//! User configuration.
//!
//! [`ConfigFile`] mirrors `~/.sensorlink/config.ini`; it converts into the
//! [`SensorServiceConfig`] the service is built with.
//!
//! # Example
//!
//! ```ignore
//! use sensorlink::config::ConfigFile;
//! use sensorlink::service::SensorServiceConfig;
//!
//! let file = ConfigFile::load()?;
//! let config = SensorServiceConfig::from(&file);
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, EncodingSettings, GpsdSettings, LoggingSettings, NightModeSettings,
    PollingSettings, DEFAULT_LOG_FILE,
};

use crate::service::SensorServiceConfig;

impl From<&ConfigFile> for SensorServiceConfig {
    fn from(file: &ConfigFile) -> Self {
        Self {
            gpsd_host: file.gpsd.host.clone(),
            gpsd_port: file.gpsd.port,
            gpsd_connect_timeout: file.gpsd.connect_timeout,
            night_mode_marker: file.night_mode.marker.clone(),
            poll_interval: file.polling.interval,
            rounding: file.encoding.rounding,
        }
    }
}
