//! Configuration for the sensor service.

use std::path::PathBuf;
use std::time::Duration;

use super::encode::ScaleRounding;
use crate::location::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};
use crate::night_mode::DEFAULT_NIGHT_MODE_MARKER;

/// Default poll period, end of one tick to start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Sensor service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorServiceConfig {
    /// Location daemon host.
    pub gpsd_host: String,

    /// Location daemon port.
    pub gpsd_port: u16,

    /// Timeout for the location daemon TCP connect.
    pub gpsd_connect_timeout: Duration,

    /// Marker file whose presence means night mode.
    pub night_mode_marker: PathBuf,

    /// Delay between the end of one poll tick and the start of the next.
    pub poll_interval: Duration,

    /// How scaled location values are converted to integers.
    pub rounding: ScaleRounding,
}

impl SensorServiceConfig {
    pub fn with_gpsd_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.gpsd_host = host.into();
        self.gpsd_port = port;
        self
    }

    pub fn with_night_mode_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.night_mode_marker = path.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_rounding(mut self, rounding: ScaleRounding) -> Self {
        self.rounding = rounding;
        self
    }
}

impl Default for SensorServiceConfig {
    fn default() -> Self {
        Self {
            gpsd_host: DEFAULT_GPSD_HOST.to_string(),
            gpsd_port: DEFAULT_GPSD_PORT,
            gpsd_connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            night_mode_marker: PathBuf::from(DEFAULT_NIGHT_MODE_MARKER),
            poll_interval: DEFAULT_POLL_INTERVAL,
            rounding: ScaleRounding::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SensorServiceConfig::default();
        assert_eq!(config.gpsd_host, "127.0.0.1");
        assert_eq!(config.gpsd_port, 2947);
        assert_eq!(
            config.night_mode_marker,
            PathBuf::from("/tmp/night_mode_enabled")
        );
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.rounding, ScaleRounding::Truncate);
    }

    #[test]
    fn test_builder_setters() {
        let config = SensorServiceConfig::default()
            .with_gpsd_endpoint("10.0.0.2", 3000)
            .with_night_mode_marker("/run/night")
            .with_poll_interval(Duration::from_millis(100))
            .with_rounding(ScaleRounding::Nearest);

        assert_eq!(config.gpsd_host, "10.0.0.2");
        assert_eq!(config.gpsd_port, 3000);
        assert_eq!(config.night_mode_marker, PathBuf::from("/run/night"));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.rounding, ScaleRounding::Nearest);
    }
}
