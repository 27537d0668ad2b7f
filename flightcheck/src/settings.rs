// flightcheck/src/settings.rs
//! Locating and loading the user's settings file.
//!
//! Discovery order: the path given with `--config` (or `$FLIGHTCHECK_SETTINGS`, which
//! clap folds into the same flag), then `~/.flightcheck/settings.yaml`, then
//! `<config dir>/flightcheck/settings.yaml`. The first file found is merged over the
//! embedded defaults. An explicitly named file must exist.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use flightcheck_core::config::{merge_settings, EngineSettings};

pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
const HOME_SETTINGS_DIR: &str = ".flightcheck";
const APP_DIR_NAME: &str = "flightcheck";

/// Default locations searched when no settings file is named, in priority order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(HOME_SETTINGS_DIR).join(SETTINGS_FILE_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME));
    }
    candidates
}

/// Resolves the settings file to load, if any.
pub fn discover_settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let found = candidate_paths().into_iter().find(|p| p.is_file());
    match &found {
        Some(path) => debug!("Discovered settings file at {}", path.display()),
        None => debug!("No settings file found; using built-in defaults."),
    }
    found
}

/// Loads the embedded defaults merged with the discovered settings file.
pub fn load_effective_settings(explicit: Option<&Path>) -> Result<EngineSettings> {
    let defaults = EngineSettings::load_default()?;
    let user = match discover_settings_path(explicit) {
        Some(path) => {
            info!("Using settings file {}", path.display());
            Some(
                EngineSettings::load_from_file(&path)
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            )
        }
        None => None,
    };
    Ok(merge_settings(defaults, user))
}
