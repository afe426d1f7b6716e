//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module is the single place where INI key names are mapped to
//! struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::time::Duration;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::service::ScaleRounding;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [gpsd] section
    if let Some(section) = ini.section(Some("gpsd")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                config.gpsd.host = v.to_string();
            }
        }
        if let Some(v) = section.get("port") {
            config.gpsd.port = v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "gpsd".to_string(),
                key: "port".to_string(),
                value: v.to_string(),
                reason: "must be a port number between 0 and 65535".to_string(),
            })?;
        }
        if let Some(v) = section.get("connect_timeout_ms") {
            config.gpsd.connect_timeout = parse_millis("gpsd", "connect_timeout_ms", v)?;
        }
    }

    // [night_mode] section
    if let Some(section) = ini.section(Some("night_mode")) {
        if let Some(v) = section.get("marker") {
            let v = v.trim();
            if !v.is_empty() {
                config.night_mode.marker = expand_tilde(v);
            }
        }
    }

    // [polling] section
    if let Some(section) = ini.section(Some("polling")) {
        if let Some(v) = section.get("interval_ms") {
            config.polling.interval = parse_millis("polling", "interval_ms", v)?;
        }
    }

    // [encoding] section
    if let Some(section) = ini.section(Some("encoding")) {
        if let Some(v) = section.get("rounding") {
            config.encoding.rounding =
                v.parse::<ScaleRounding>()
                    .map_err(|_| ConfigFileError::InvalidValue {
                        section: "encoding".to_string(),
                        key: "rounding".to_string(),
                        value: v.to_string(),
                        reason: "must be one of: truncate, nearest".to_string(),
                    })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Positive millisecond duration.
fn parse_millis(section: &str, key: &str, value: &str) -> Result<Duration, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a positive number of milliseconds".to_string(),
        }),
    }
}

/// Expand tilde (~) to home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
