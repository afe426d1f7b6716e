//! Day/night mode signal.
//!
//! Night mode is a marker file: if the path can be opened for reading the
//! head unit is in night mode. The file's contents are never read.

use std::fs::File;
use std::path::{Path, PathBuf};

/// Default marker path.
pub const DEFAULT_NIGHT_MODE_MARKER: &str = "/tmp/night_mode_enabled";

/// Source of the current day/night state.
pub trait NightModeSource: Send {
    fn is_night(&self) -> bool;
}

/// Night mode signalled by the presence of a marker file.
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for MarkerFile {
    fn default() -> Self {
        Self::new(DEFAULT_NIGHT_MODE_MARKER)
    }
}

impl NightModeSource for MarkerFile {
    fn is_night(&self) -> bool {
        File::open(&self.path).is_ok()
    }
}
