//! Error types for camara
//!
//! All modules use `CamaraResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for camara operations
pub type CamaraResult<T> = Result<T, CamaraError>;

/// All errors that can occur in camara
#[derive(Error, Debug)]
pub enum CamaraError {
    // Camera errors
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Camera access denied: {0}")]
    CameraAccessDenied(String),

    #[error("No active camera session. Open the camera first")]
    NoActiveSession,

    // Photo store errors
    #[error("Photo storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("No photos captured yet")]
    NoPhotos,

    #[error("Photo not found: {0}")]
    PhotoNotFound(i64),

    #[error("Image error: {0}")]
    Image(String),

    // Offline cache errors
    #[error("Network unavailable for {url}: {reason}")]
    NetworkUnavailable { url: String, reason: String },

    #[error("Asset {url} answered with status {status}")]
    AssetRejected { url: String, status: u16 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CamaraError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error for the given path
    pub fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a network error for the given URL
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::NetworkUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DeviceUnavailable(_) => {
                Some("Check camera.source in your config or pass --source <image>")
            }
            Self::CameraAccessDenied(_) => Some("Grant read access to the camera source"),
            Self::NoActiveSession => Some("Run: camara capture"),
            Self::StorageUnavailable { .. } => {
                Some("Check store.dir permissions or pass --data-dir")
            }
            Self::NoPhotos => Some("Run: camara capture"),
            Self::NetworkUnavailable { .. } => {
                Some("Check offline.origin, or run: camara cache install while online")
            }
            _ => None,
        }
    }
}
