//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[gpsd]
; Location daemon address. If it can't be reached at start the service
; runs without location events.
host = {}
port = {}
connect_timeout_ms = {}

[night_mode]
; Night mode is on while this file exists
marker = {}

[polling]
; Delay between the end of one poll tick and the start of the next
interval_ms = {}

[encoding]
; How scaled location values become integers:
;   truncate - toward zero
;   nearest  - to nearest, halves away from zero
rounding = {}

[logging]
file = {}
"#,
        config.gpsd.host,
        config.gpsd.port,
        config.gpsd.connect_timeout.as_millis(),
        path_to_string(&config.night_mode.marker),
        config.polling.interval.as_millis(),
        config.encoding.rounding,
        path_to_string(&config.logging.file),
    )
}

/// Convert a path to string, using ~ for the home directory.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sections_written() {
        let content = to_config_string(&ConfigFile::default());

        for section in ["[gpsd]", "[night_mode]", "[polling]", "[encoding]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("port = 2947"));
        assert!(content.contains("interval_ms = 250"));
        assert!(content.contains("rounding = truncate"));
        assert!(content.contains("marker = /tmp/night_mode_enabled"));
    }
}
