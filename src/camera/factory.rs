//! Camera factory for creating the configured device

use crate::camera::device::CameraDevice;
use crate::camera::still::StillImageCamera;
use crate::camera::synthetic::SyntheticCamera;
use crate::config::schema::CameraConfig;
use std::path::Path;

/// Create the camera device described by the configuration
///
/// An explicit `source` override wins over `camera.source`; with neither,
/// the synthetic test-pattern camera is used.
pub fn create_camera(config: &CameraConfig, source: Option<&Path>) -> Box<dyn CameraDevice> {
    match source.or(config.source.as_deref()) {
        Some(path) => Box::new(StillImageCamera::new(path)),
        None => Box::new(SyntheticCamera::new()),
    }
}
