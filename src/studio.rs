//! Studio: capture, store and browse in one place
//!
//! Wires the capture session, the photo library and the gallery navigator
//! together. User-driven actions run one at a time: a clear never
//! interleaves with a capture and its gallery reload.

use crate::camera::{CaptureSession, FacingMode, SessionState};
use crate::error::CamaraResult;
use crate::gallery::Gallery;
use crate::store::{PhotoLibrary, PhotoRecord};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Camera, library and gallery behind a single-action guard
pub struct Studio {
    session: Mutex<CaptureSession>,
    library: Arc<PhotoLibrary>,
    gallery: Mutex<Gallery>,
    action: Mutex<()>,
}

impl Studio {
    /// Create a studio over a session and library; the gallery starts empty
    /// until [`Studio::load`]
    pub fn new(session: CaptureSession, library: Arc<PhotoLibrary>) -> Self {
        Self {
            session: Mutex::new(session),
            gallery: Mutex::new(Gallery::new(Arc::clone(&library))),
            library,
            action: Mutex::new(()),
        }
    }

    /// The underlying library
    pub fn library(&self) -> &Arc<PhotoLibrary> {
        &self.library
    }

    /// Current capture session state
    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Name of the camera device in use
    pub async fn device_name(&self) -> String {
        self.session.lock().await.device_name()
    }

    /// Load the gallery snapshot from the library
    pub async fn load(&self) -> CamaraResult<()> {
        let _action = self.action.lock().await;
        self.gallery.lock().await.reload().await
    }

    /// Borrow the gallery navigator
    pub async fn gallery(&self) -> MutexGuard<'_, Gallery> {
        self.gallery.lock().await
    }

    /// Open the camera, take one still, store it and refresh the gallery
    ///
    /// The camera is closed again as soon as the still is taken. On failure
    /// nothing is stored and the session ends `Idle`.
    pub async fn take_photo(&self, facing: FacingMode) -> CamaraResult<PhotoRecord> {
        let _action = self.action.lock().await;

        let still = {
            let mut session = self.session.lock().await;
            session.open(facing).await?;
            session.capture().await?
        };
        debug!("Still ready: {}x{}", still.width, still.height);

        let record = self.library.insert(still.data_url).await?;
        self.gallery.lock().await.reload().await?;

        info!("Photo {} added to gallery", record.id);
        Ok(record)
    }

    /// Delete every photo and empty the gallery. Irreversible.
    pub async fn clear_gallery(&self) -> CamaraResult<()> {
        let _action = self.action.lock().await;
        self.gallery.lock().await.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{SyntheticCamera, SyntheticOutcome};
    use crate::error::CamaraError;
    use crate::store::{Clock, MemoryRecordStore};
    use std::sync::atomic::{AtomicI64, Ordering};

    fn studio_with(camera: SyntheticCamera) -> Studio {
        let next = Arc::new(AtomicI64::new(10_000));
        let clock: Clock = Arc::new(move || next.fetch_add(1, Ordering::SeqCst));
        let library = Arc::new(PhotoLibrary::with_clock(
            Arc::new(MemoryRecordStore::new()),
            clock,
        ));
        Studio::new(CaptureSession::new(Box::new(camera)), library)
    }

    #[tokio::test]
    async fn back_camera_photo_is_stored_unmirrored() {
        let camera = SyntheticCamera::new().with_native_size(320, 240);
        let studio = studio_with(camera.clone());

        let record = studio.take_photo(FacingMode::Back).await.unwrap();
        assert_eq!(studio.session_state().await, SessionState::Idle);
        assert_eq!(camera.stop_count(), 1);

        let image = record.decode().unwrap();
        assert_eq!(image.dimensions(), (320, 240));
        // Unmirrored: red channel follows x
        assert_eq!(image.get_pixel(5, 0).0[0], 5);

        let gallery = studio.gallery().await;
        assert_eq!(gallery.current(), Some(&record));
    }

    #[tokio::test]
    async fn front_camera_photo_is_mirrored() {
        let studio = studio_with(SyntheticCamera::new().with_native_size(320, 240));

        let record = studio.take_photo(FacingMode::Front).await.unwrap();
        let image = record.decode().unwrap();
        assert_eq!(image.get_pixel(0, 0).0[0], (319 % 256) as u8);
    }

    #[tokio::test]
    async fn denied_camera_stores_nothing() {
        let studio = studio_with(SyntheticCamera::with_outcome(SyntheticOutcome::Denied));

        let err = studio.take_photo(FacingMode::Back).await.unwrap_err();
        assert!(matches!(err, CamaraError::CameraAccessDenied(_)));
        assert_eq!(studio.session_state().await, SessionState::Idle);
        assert!(studio.library().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn photos_accumulate_newest_last() {
        let studio = studio_with(SyntheticCamera::new());
        let first = studio.take_photo(FacingMode::Back).await.unwrap();
        let second = studio.take_photo(FacingMode::Front).await.unwrap();

        let gallery = studio.gallery().await;
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.current(), Some(&second));
        assert!(first.id < second.id);
    }

    #[tokio::test]
    async fn clear_and_capture_do_not_interleave() {
        let studio = studio_with(SyntheticCamera::new());
        studio.take_photo(FacingMode::Back).await.unwrap();

        let (captured, cleared) = tokio::join!(
            studio.take_photo(FacingMode::Back),
            studio.clear_gallery()
        );
        captured.unwrap();
        cleared.unwrap();

        // Whatever the order, the gallery matches the library
        let stored = studio.library().list_all().await.unwrap();
        studio.load().await.unwrap();
        let gallery = studio.gallery().await;
        assert_eq!(gallery.records(), stored.as_slice());
        assert!(stored.len() <= 1);
    }
}
