//! Configuration schema for camara
//!
//! Configuration is stored at `~/.config/camara/config.toml`

use crate::camera::FacingMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Camera settings
    pub camera: CameraConfig,

    /// Photo store settings
    pub store: StoreConfig,

    /// Offline cache settings
    pub offline: OfflineConfig,

    /// Download settings
    pub download: DownloadConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Preferred facing mode
    pub facing: FacingMode,

    /// Preferred frame width (advisory)
    pub ideal_width: u32,

    /// Preferred frame height (advisory)
    pub ideal_height: u32,

    /// Image file used as the camera feed; unset uses the test-pattern camera
    pub source: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Back,
            ideal_width: 320,
            ideal_height: 240,
            source: None,
        }
    }
}

/// Photo store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding photo records (default: `<data_dir>/photos`)
    pub dir: Option<PathBuf>,
}

/// Offline cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Base URL the application is served from
    pub origin: String,

    /// Name of the current cache generation
    pub generation: String,

    /// Core assets cached at install time, relative to `origin`
    pub assets: Vec<String>,

    /// Page served for document requests when offline
    pub entry_point: String,

    /// Directory holding cache generations (default: `<data_dir>/offline`)
    pub dir: Option<PathBuf>,

    /// Overall network timeout in seconds; unset waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080/".to_string(),
            generation: "pwa-camara-v1".to_string(),
            assets: vec![
                "./".to_string(),
                "./index.html".to_string(),
                "./app.js".to_string(),
                "./manifest.json".to_string(),
            ],
            entry_point: "./index.html".to_string(),
            dir: None,
            timeout_secs: None,
        }
    }
}

/// Download configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory downloads are written to (default: current directory)
    pub dir: Option<PathBuf>,
}
