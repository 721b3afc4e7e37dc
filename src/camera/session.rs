//! Capture session lifecycle
//!
//! `Idle -> Requesting -> Live -> (Capturing) -> Idle`. Taking a photo is a
//! single-shot action: the stream is torn down right after every capture.

use crate::camera::device::{CameraDevice, FacingMode, MediaStream, StreamConstraints};
use crate::camera::frame::Frame;
use crate::camera::raster::{rasterize, Still};
use crate::error::{CamaraError, CamaraResult};
use std::fmt;
use tracing::{debug, info, warn};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream; initial and terminal state
    Idle,
    /// Waiting for the device to grant a stream
    Requesting,
    /// Stream running, preview available
    Live,
    /// Rasterizing the current frame
    Capturing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Requesting => write!(f, "requesting"),
            Self::Live => write!(f, "live"),
            Self::Capturing => write!(f, "capturing"),
        }
    }
}

/// Owns the camera device and at most one live stream
pub struct CaptureSession {
    device: Box<dyn CameraDevice>,
    ideal_width: u32,
    ideal_height: u32,
    state: SessionState,
    facing: FacingMode,
    stream: Option<Box<dyn MediaStream>>,
    dimensions: Option<(u32, u32)>,
    last_capture: Option<Still>,
}

impl CaptureSession {
    /// Create an idle session requesting 320x240 streams
    pub fn new(device: Box<dyn CameraDevice>) -> Self {
        let defaults = StreamConstraints::low_res(FacingMode::Back);
        Self {
            device,
            ideal_width: defaults.ideal_width,
            ideal_height: defaults.ideal_height,
            state: SessionState::Idle,
            facing: defaults.facing,
            stream: None,
            dimensions: None,
            last_capture: None,
        }
    }

    /// Override the preferred stream resolution
    pub fn with_ideal_size(mut self, width: u32, height: u32) -> Self {
        self.ideal_width = width;
        self.ideal_height = height;
        self
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Facing mode of the current (or most recent) stream
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Negotiated frame dimensions while live
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// The most recent still, if any capture happened
    pub fn last_capture(&self) -> Option<&Still> {
        self.last_capture.as_ref()
    }

    /// Name of the underlying device
    pub fn device_name(&self) -> String {
        self.device.name()
    }

    /// Request the camera and start a live stream
    ///
    /// On denial or a missing device the session returns to `Idle` and the
    /// error is handed back to the caller; nothing is retried.
    pub async fn open(&mut self, facing: FacingMode) -> CamaraResult<()> {
        if self.stream.is_some() {
            debug!("Closing previous stream before reopening");
            self.close().await;
        }

        self.state = SessionState::Requesting;
        self.facing = facing;

        let constraints = StreamConstraints {
            facing,
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
        };

        let stream = match self.device.acquire(&constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Camera request failed: {}", e);
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        // Feeds without size metadata fall back to the requested size
        let settings = stream.settings();
        let width = if settings.width == 0 {
            self.ideal_width
        } else {
            settings.width
        };
        let height = if settings.height == 0 {
            self.ideal_height
        } else {
            settings.height
        };

        self.dimensions = Some((width, height));
        self.stream = Some(stream);
        self.state = SessionState::Live;

        info!(
            "Camera open: {} ({}, {}x{})",
            self.device.name(),
            facing,
            width,
            height
        );
        Ok(())
    }

    /// Current frame as shown in the live preview
    ///
    /// The preview of a front-facing stream is always mirrored.
    pub async fn preview(&mut self) -> CamaraResult<Frame> {
        if self.state != SessionState::Live {
            return Err(CamaraError::NoActiveSession);
        }
        let stream = self.stream.as_mut().ok_or(CamaraError::NoActiveSession)?;

        let frame = stream.grab_frame().await?;
        if self.facing.is_mirrored() {
            Ok(frame.mirrored())
        } else {
            Ok(frame)
        }
    }

    /// Take one still and close the camera
    pub async fn capture(&mut self) -> CamaraResult<Still> {
        if self.state != SessionState::Live {
            return Err(CamaraError::NoActiveSession);
        }
        let (width, height) = self.dimensions.ok_or(CamaraError::NoActiveSession)?;

        self.state = SessionState::Capturing;
        let grabbed = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame().await,
            None => Err(CamaraError::NoActiveSession),
        };
        let mirror = self.facing.is_mirrored();
        let result = grabbed.and_then(|frame| rasterize(&frame, width, height, mirror));

        self.close().await;

        let still = result?;
        info!(
            "Captured {}x{} still ({} bytes encoded)",
            still.width,
            still.height,
            still.data_url.len()
        );
        self.last_capture = Some(still.clone());
        Ok(still)
    }

    /// Stop the device and return to `Idle`
    ///
    /// Safe to call in any state. A failing stop is logged and ignored.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.stop().await {
                warn!("Stopping camera stream failed: {}", e);
            } else {
                debug!("Camera stream stopped");
            }
        }
        self.dimensions = None;
        self.state = SessionState::Idle;
    }

    /// Close, then reopen with the other facing mode
    pub async fn switch_facing(&mut self) -> CamaraResult<()> {
        let next = self.facing.other();
        self.close().await;
        self.open(next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::raster::decode_data_url;
    use crate::camera::synthetic::{test_pattern, SyntheticCamera, SyntheticOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn session_with(camera: &SyntheticCamera) -> CaptureSession {
        CaptureSession::new(Box::new(camera.clone()))
    }

    #[tokio::test]
    async fn back_capture_scenario() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera);

        session.open(FacingMode::Back).await.unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert_eq!(session.dimensions(), Some((320, 240)));

        let still = session.capture().await.unwrap();
        assert_eq!((still.width, still.height), (320, 240));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(camera.stop_count(), 1);

        let decoded = decode_data_url(&still.data_url).unwrap();
        assert_eq!(decoded.as_raw(), test_pattern(320, 240, 0).unwrap().rgba());
        assert_eq!(session.last_capture(), Some(&still));
    }

    #[tokio::test]
    async fn front_capture_is_mirror_of_back() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera).with_ideal_size(12, 8);

        session.open(FacingMode::Back).await.unwrap();
        let back = decode_data_url(&session.capture().await.unwrap().data_url).unwrap();

        session.open(FacingMode::Front).await.unwrap();
        let front = decode_data_url(&session.capture().await.unwrap().data_url).unwrap();

        assert_eq!(front, image::imageops::flip_horizontal(&back));
    }

    #[tokio::test]
    async fn front_preview_is_mirrored() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera).with_ideal_size(6, 4);

        session.open(FacingMode::Front).await.unwrap();
        let preview = session.preview().await.unwrap();
        assert_eq!(preview, test_pattern(6, 4, 0).unwrap().mirrored());
        assert_eq!(session.state(), SessionState::Live);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();

        session.close().await;
        assert_eq!(session.state(), SessionState::Idle);
        session.close().await;
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(camera.stop_count(), 1);
    }

    #[tokio::test]
    async fn capture_without_session_fails() {
        let mut session = session_with(&SyntheticCamera::new());
        let err = session.capture().await.unwrap_err();
        assert!(matches!(err, CamaraError::NoActiveSession));
        assert!(matches!(
            session.preview().await.unwrap_err(),
            CamaraError::NoActiveSession
        ));
    }

    #[tokio::test]
    async fn denied_request_returns_to_idle() {
        let camera = SyntheticCamera::with_outcome(SyntheticOutcome::Denied);
        let mut session = session_with(&camera);

        let err = session.open(FacingMode::Back).await.unwrap_err();
        assert!(matches!(err, CamaraError::CameraAccessDenied(_)));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.dimensions().is_none());
    }

    #[tokio::test]
    async fn failing_stop_is_swallowed() {
        let camera = SyntheticCamera::new().failing_stop();
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();

        let still = session.capture().await.unwrap();
        assert_eq!(still.width, 320);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(camera.stop_count(), 1);
    }

    #[tokio::test]
    async fn unreported_size_falls_back_to_ideal() {
        let camera = SyntheticCamera::new().without_reported_size();
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();
        assert_eq!(session.dimensions(), Some((320, 240)));
    }

    #[tokio::test]
    async fn device_resolution_is_authoritative() {
        let camera = SyntheticCamera::new().with_native_size(64, 48);
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();

        let still = session.capture().await.unwrap();
        assert_eq!((still.width, still.height), (64, 48));
    }

    #[tokio::test]
    async fn reopening_stops_previous_stream() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();
        session.open(FacingMode::Back).await.unwrap();

        assert_eq!(camera.stop_count(), 1);
        assert_eq!(session.state(), SessionState::Live);
    }

    #[tokio::test]
    async fn switch_facing_reopens_other_camera() {
        let camera = SyntheticCamera::new();
        let mut session = session_with(&camera);
        session.open(FacingMode::Back).await.unwrap();

        session.switch_facing().await.unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert_eq!(session.facing(), FacingMode::Front);
        assert_eq!(
            camera.requested_facings(),
            vec![FacingMode::Back, FacingMode::Front]
        );
    }

    /// Grants the first request, refuses every later one
    struct GrantOnce {
        inner: SyntheticCamera,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CameraDevice for GrantOnce {
        async fn acquire(
            &self,
            constraints: &StreamConstraints,
        ) -> CamaraResult<Box<dyn MediaStream>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.inner.acquire(constraints).await
            } else {
                Err(CamaraError::DeviceUnavailable("front camera missing".to_string()))
            }
        }

        fn name(&self) -> String {
            "grant-once".to_string()
        }
    }

    #[tokio::test]
    async fn failed_switch_ends_idle() {
        let mut session = CaptureSession::new(Box::new(GrantOnce {
            inner: SyntheticCamera::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }));
        session.open(FacingMode::Back).await.unwrap();

        let err = session.switch_facing().await.unwrap_err();
        assert!(matches!(err, CamaraError::DeviceUnavailable(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }
}
