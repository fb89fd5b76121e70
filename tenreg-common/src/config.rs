//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Soft geofence for coordinate validation.
///
/// Coordinates inside the global valid range but outside this box are
/// flagged as advisory warnings, not errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl Default for RegionalBounds {
    fn default() -> Self {
        // Registration area covered by the current field campaign
        Self {
            min_latitude: 35.5,
            max_latitude: 37.0,
            min_longitude: 36.5,
            max_longitude: 38.0,
        }
    }
}

impl RegionalBounds {
    /// True when the point lies inside the configured box
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }
}

/// Tunables for the bulk import pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Regional soft geofence for building coordinates
    pub region: RegionalBounds,

    /// Maximum error strings carried on a final import report
    pub max_reported_errors: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            region: RegionalBounds::default(),
            max_reported_errors: 10,
        }
    }
}

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. TENREG_DATA environment variable
/// 3. `data_folder` key in the platform config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("TENREG_DATA") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = platform_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent default
    default_data_folder()
}

/// Database file path inside the data folder
pub fn database_path(data_folder: &Path) -> PathBuf {
    data_folder.join("tenreg.db")
}

/// Load import settings from `<data_folder>/config.toml`, `[import]` table.
///
/// A missing file or missing table yields defaults; a present but
/// malformed file is a configuration error the operator must fix.
pub fn load_import_settings(data_folder: &Path) -> Result<ImportSettings> {
    let path = data_folder.join("config.toml");
    if !path.exists() {
        return Ok(ImportSettings::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    match config.get("import") {
        Some(table) => table
            .clone()
            .try_into()
            .map_err(|e| Error::Config(format!("[import] section: {}", e))),
        None => Ok(ImportSettings::default()),
    }
}

/// Get platform config file path
fn platform_config_file() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("tenreg").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tenreg"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/tenreg"))
}
