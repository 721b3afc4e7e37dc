//! Capture session manager
//!
//! Owns the camera lifecycle (acquire, preview, stop) and turns the live
//! feed into lossless stills:
//! - `device`: traits implemented by camera backends
//! - `session`: the capture state machine
//! - `raster`: frame to PNG data URL conversion

mod device;
mod factory;
mod frame;
pub mod raster;
mod session;
mod still;
mod synthetic;

pub use device::{CameraDevice, FacingMode, MediaStream, StreamConstraints, StreamSettings};
pub use factory::create_camera;
pub use frame::Frame;
pub use raster::Still;
pub use session::{CaptureSession, SessionState};
pub use still::StillImageCamera;
pub use synthetic::{test_pattern, SyntheticCamera, SyntheticOutcome};
