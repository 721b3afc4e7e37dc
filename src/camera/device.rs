//! Camera device abstraction
//!
//! Provides traits for stream acquisition that can be implemented by
//! different backends (image-file feed, synthetic test pattern, test doubles).

use crate::camera::frame::Frame;
use crate::error::CamaraResult;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which physical camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// User-facing camera; preview and stills are mirrored
    #[serde(alias = "user")]
    #[value(alias = "user")]
    Front,
    /// Environment-facing camera
    #[serde(alias = "environment")]
    #[value(alias = "environment")]
    Back,
}

impl FacingMode {
    /// The opposite camera
    pub fn other(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Whether output for this facing mode is horizontally mirrored
    pub fn is_mirrored(self) -> bool {
        matches!(self, Self::Front)
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Advisory constraints passed to a device when requesting a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Preferred facing mode
    pub facing: FacingMode,
    /// Preferred frame width
    pub ideal_width: u32,
    /// Preferred frame height
    pub ideal_height: u32,
}

impl StreamConstraints {
    /// Low-resolution constraints (320x240) for the given facing mode
    pub fn low_res(facing: FacingMode) -> Self {
        Self {
            facing,
            ideal_width: 320,
            ideal_height: 240,
        }
    }
}

/// Settings actually negotiated by the device
///
/// These are authoritative for rasterization. A device that cannot report
/// its size yet returns zero dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Negotiated frame width
    pub width: u32,
    /// Negotiated frame height
    pub height: u32,
}

/// A live stream of frames from an acquired device
#[async_trait]
pub trait MediaStream: Send + Sync {
    /// Negotiated stream settings
    fn settings(&self) -> StreamSettings;

    /// Grab the current frame of the live feed
    async fn grab_frame(&mut self) -> CamaraResult<Frame>;

    /// Stop every track and release the device
    async fn stop(&mut self) -> CamaraResult<()>;
}

/// A camera that can be asked for a stream
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request access and start a stream
    ///
    /// Fails with `CameraAccessDenied` when permission is refused and with
    /// `DeviceUnavailable` when no matching device exists.
    async fn acquire(&self, constraints: &StreamConstraints)
        -> CamaraResult<Box<dyn MediaStream>>;

    /// Human-readable device name for display
    fn name(&self) -> String;
}
