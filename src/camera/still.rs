//! Image-file camera backend
//!
//! Treats a PNG file as the live feed of a fixed camera. The file's native
//! resolution is what the device negotiates; requested sizes are advisory
//! and ignored, just like a real sensor with a fixed mode.

use crate::camera::device::{CameraDevice, MediaStream, StreamConstraints, StreamSettings};
use crate::camera::frame::Frame;
use crate::error::{CamaraError, CamaraResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Camera whose feed is a still image on disk
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// Create a camera backed by the image at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the image used as feed
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> CamaraResult<Box<dyn MediaStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => CamaraError::CameraAccessDenied(format!(
                "cannot read {}: {}",
                self.path.display(),
                e
            )),
            _ => CamaraError::DeviceUnavailable(format!("{}: {}", self.path.display(), e)),
        })?;

        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            CamaraError::DeviceUnavailable(format!(
                "{} is not a usable feed: {}",
                self.path.display(),
                e
            ))
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let frame = Frame::new(width, height, rgba.into_raw())?;

        debug!(
            "Still-image stream from {} at {}x{} (requested {}x{} {})",
            self.path.display(),
            width,
            height,
            constraints.ideal_width,
            constraints.ideal_height,
            constraints.facing
        );

        Ok(Box::new(StillImageStream { frame }))
    }

    fn name(&self) -> String {
        format!("Image feed {}", self.path.display())
    }
}

struct StillImageStream {
    frame: Frame,
}

#[async_trait]
impl MediaStream for StillImageStream {
    fn settings(&self) -> StreamSettings {
        StreamSettings {
            width: self.frame.width(),
            height: self.frame.height(),
        }
    }

    async fn grab_frame(&mut self) -> CamaraResult<Frame> {
        Ok(self.frame.clone())
    }

    async fn stop(&mut self) -> CamaraResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::device::FacingMode;
    use crate::camera::synthetic::test_pattern;
    use image::{ImageFormat, RgbaImage};
    use tempfile::TempDir;

    #[tokio::test]
    async fn streams_file_at_native_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.png");
        let frame = test_pattern(8, 6, 0).unwrap();
        RgbaImage::from_raw(8, 6, frame.rgba().to_vec())
            .unwrap()
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let camera = StillImageCamera::new(&path);
        let mut stream = camera
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .unwrap();

        assert_eq!(
            stream.settings(),
            StreamSettings {
                width: 8,
                height: 6
            }
        );
        assert_eq!(stream.grab_frame().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn missing_file_is_unavailable_device() {
        let dir = TempDir::new().unwrap();
        let camera = StillImageCamera::new(dir.path().join("nope.png"));
        let err = camera
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CamaraError::DeviceUnavailable(_)));
    }

    #[tokio::test]
    async fn garbage_file_is_unavailable_device() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = StillImageCamera::new(&path)
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CamaraError::DeviceUnavailable(_)));
    }
}
