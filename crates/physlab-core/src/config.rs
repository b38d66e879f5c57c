//! Save directory configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the save directory.
pub const HOME_PATH_VAR: &str = "PHYSICSLAB_HOME_PATH";

/// Fallback save directory, relative to the working directory.
pub const FALLBACK_DIR: &str = "physicsLabSav";

/// Where the application keeps saves under the user's home on Windows.
const WINDOWS_SAVE_DIR: [&str; 5] = ["AppData", "LocalLow", "CIVITAS", "Quantum Physics", "Circuit"];

/// Runtime configuration for a lab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabConfig {
    /// Directory scanned for `.sav` files and used for new experiments.
    pub root_dir: PathBuf,
}

impl LabConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Resolve the save directory from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve the save directory through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(HOME_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            return Self::new(path.trim());
        }
        Self::new(platform_default())
    }
}

impl Default for LabConfig {
    fn default() -> Self {
        Self::new(platform_default())
    }
}

fn platform_default() -> PathBuf {
    if cfg!(windows) {
        if let Some(home) = dirs::home_dir() {
            return WINDOWS_SAVE_DIR.iter().fold(home, |path, part| path.join(part));
        }
    }
    PathBuf::from(FALLBACK_DIR)
}
