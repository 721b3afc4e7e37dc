//! Deterministic synthetic camera for tests and camera-less machines

use crate::camera::device::{
    CameraDevice, FacingMode, MediaStream, StreamConstraints, StreamSettings,
};
use crate::camera::frame::Frame;
use crate::error::{CamaraError, CamaraResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// What the synthetic device does when a stream is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticOutcome {
    /// Grant access and stream the test pattern
    Available,
    /// Refuse permission
    Denied,
    /// Behave as if no camera is attached
    Absent,
}

/// Synthetic camera producing an asymmetric test pattern
///
/// Red grows left to right and green top to bottom, so mirroring and
/// rotation are visible in the output. Blue advances with every grabbed
/// frame.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    outcome: SyntheticOutcome,
    native_size: Option<(u32, u32)>,
    report_size: bool,
    fail_stop: bool,
    stops: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<FacingMode>>>,
}

impl SyntheticCamera {
    /// Creates a camera that honors the requested ideal resolution
    pub fn new() -> Self {
        Self {
            outcome: SyntheticOutcome::Available,
            native_size: None,
            report_size: true,
            fail_stop: false,
            stops: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a camera that refuses or lacks a device
    pub fn with_outcome(outcome: SyntheticOutcome) -> Self {
        Self {
            outcome,
            ..Self::new()
        }
    }

    /// Streams at a fixed native size regardless of the request
    pub fn with_native_size(mut self, width: u32, height: u32) -> Self {
        self.native_size = Some((width, height));
        self
    }

    /// Streams report zero dimensions, like a feed without metadata yet
    pub fn without_reported_size(mut self) -> Self {
        self.report_size = false;
        self
    }

    /// Make `stop()` fail on every stream
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Number of stream stops observed so far
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Facing modes requested so far, in order
    pub fn requested_facings(&self) -> Vec<FacingMode> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn acquire(
        &self,
        constraints: &StreamConstraints,
    ) -> CamaraResult<Box<dyn MediaStream>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(constraints.facing);
        }

        match self.outcome {
            SyntheticOutcome::Denied => {
                return Err(CamaraError::CameraAccessDenied(
                    "permission refused by user".to_string(),
                ))
            }
            SyntheticOutcome::Absent => {
                return Err(CamaraError::DeviceUnavailable(
                    "no camera attached".to_string(),
                ))
            }
            SyntheticOutcome::Available => {}
        }

        let (width, height) = self
            .native_size
            .unwrap_or((constraints.ideal_width, constraints.ideal_height));
        debug!(
            "Synthetic stream started at {}x{} ({})",
            width, height, constraints.facing
        );

        Ok(Box::new(SyntheticStream {
            width,
            height,
            report_size: self.report_size,
            fail_stop: self.fail_stop,
            sequence: 0,
            stops: Arc::clone(&self.stops),
        }))
    }

    fn name(&self) -> String {
        "Synthetic test pattern".to_string()
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    report_size: bool,
    fail_stop: bool,
    sequence: u32,
    stops: Arc<AtomicUsize>,
}

#[async_trait]
impl MediaStream for SyntheticStream {
    fn settings(&self) -> StreamSettings {
        if self.report_size {
            StreamSettings {
                width: self.width,
                height: self.height,
            }
        } else {
            StreamSettings {
                width: 0,
                height: 0,
            }
        }
    }

    async fn grab_frame(&mut self) -> CamaraResult<Frame> {
        let frame = test_pattern(self.width, self.height, self.sequence)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    async fn stop(&mut self) -> CamaraResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop {
            return Err(CamaraError::Internal("track refused to stop".to_string()));
        }
        Ok(())
    }
}

/// Builds the synthetic test pattern for one frame
pub fn test_pattern(width: u32, height: u32, sequence: u32) -> CamaraResult<Frame> {
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            rgba.push((x % 256) as u8);
            rgba.push((y % 256) as u8);
            rgba.push(((x + 2 * y + sequence) % 256) as u8);
            rgba.push(255);
        }
    }
    Frame::new(width, height, rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn honors_ideal_resolution() {
        let camera = SyntheticCamera::new();
        let mut stream = camera
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .unwrap();

        assert_eq!(
            stream.settings(),
            StreamSettings {
                width: 320,
                height: 240
            }
        );
        let frame = stream.grab_frame().await.unwrap();
        assert_eq!((frame.width(), frame.height()), (320, 240));
    }

    #[tokio::test]
    async fn native_size_is_authoritative() {
        let camera = SyntheticCamera::new().with_native_size(640, 480);
        let stream = camera
            .acquire(&StreamConstraints::low_res(FacingMode::Front))
            .await
            .unwrap();
        assert_eq!(stream.settings().width, 640);
        assert_eq!(camera.requested_facings(), vec![FacingMode::Front]);
    }

    #[tokio::test]
    async fn denied_and_absent_outcomes() {
        let denied = SyntheticCamera::with_outcome(SyntheticOutcome::Denied);
        let err = denied
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CamaraError::CameraAccessDenied(_)));

        let absent = SyntheticCamera::with_outcome(SyntheticOutcome::Absent);
        let err = absent
            .acquire(&StreamConstraints::low_res(FacingMode::Back))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, CamaraError::DeviceUnavailable(_)));
    }

    #[test]
    fn pattern_is_horizontally_asymmetric() {
        let frame = test_pattern(4, 2, 0).unwrap();
        assert_ne!(frame.mirrored(), frame);
        assert_eq!(frame.pixel(3, 1).unwrap()[0], 3);
        assert_eq!(frame.pixel(3, 1).unwrap()[1], 1);
    }
}
