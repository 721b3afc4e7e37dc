//! Gallery navigator
//!
//! Holds a point-in-time snapshot of the library, ordered ascending by id,
//! plus a cursor. The cursor is either `None` (empty snapshot) or a valid
//! index into the current snapshot.

use crate::error::CamaraResult;
use crate::store::{PhotoLibrary, PhotoRecord};
use std::sync::Arc;
use tracing::debug;

/// Prev/next browsing over the photo library
pub struct Gallery {
    library: Arc<PhotoLibrary>,
    snapshot: Vec<PhotoRecord>,
    cursor: Option<usize>,
}

impl Gallery {
    /// Create an empty navigator; call [`Gallery::reload`] to populate it
    pub fn new(library: Arc<PhotoLibrary>) -> Self {
        Self {
            library,
            snapshot: Vec::new(),
            cursor: None,
        }
    }

    /// Replace the snapshot and point at the newest photo
    pub async fn reload(&mut self) -> CamaraResult<()> {
        let records = self.library.list_all().await?;
        self.cursor = records.len().checked_sub(1);
        self.snapshot = records;
        debug!(
            "Gallery reloaded: {} photo(s), cursor {:?}",
            self.snapshot.len(),
            self.cursor
        );
        Ok(())
    }

    /// Record under the cursor
    pub fn current(&self) -> Option<&PhotoRecord> {
        self.cursor.and_then(|index| self.snapshot.get(index))
    }

    /// Cursor index, `None` when the snapshot is empty
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    /// Step towards older photos; no-op at the first one
    pub fn prev(&mut self) {
        if let Some(index) = self.cursor {
            self.cursor = Some(index.saturating_sub(1));
        }
    }

    /// Step towards newer photos; no-op at the last one
    pub fn next(&mut self) {
        if let Some(index) = self.cursor {
            if index + 1 < self.snapshot.len() {
                self.cursor = Some(index + 1);
            }
        }
    }

    /// True when there is nothing before the cursor
    pub fn at_start(&self) -> bool {
        self.cursor.map_or(true, |index| index == 0)
    }

    /// True when there is nothing after the cursor
    pub fn at_end(&self) -> bool {
        self.cursor
            .map_or(true, |index| index + 1 == self.snapshot.len())
    }

    /// Move the cursor to the photo with `id`; returns whether it was found
    pub fn select(&mut self, id: i64) -> bool {
        match self.snapshot.iter().position(|r| r.id == id) {
            Some(index) => {
                self.cursor = Some(index);
                true
            }
            None => false,
        }
    }

    /// Move the cursor to `index`; returns whether it was in range
    pub fn select_index(&mut self, index: usize) -> bool {
        if index < self.snapshot.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// Number of photos in the snapshot
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// True when the snapshot holds no photos
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// The whole snapshot, ascending by id
    pub fn records(&self) -> &[PhotoRecord] {
        &self.snapshot
    }

    /// Delete every photo in the library and empty the snapshot
    ///
    /// Irreversible. Callers must get explicit confirmation first.
    pub async fn clear(&mut self) -> CamaraResult<()> {
        self.library.clear_all().await?;
        self.snapshot.clear();
        self.cursor = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Clock, MemoryRecordStore};
    use std::sync::atomic::{AtomicI64, Ordering};

    async fn gallery_with(count: usize) -> Gallery {
        let next = Arc::new(AtomicI64::new(1_000));
        let clock: Clock = Arc::new(move || next.fetch_add(1, Ordering::SeqCst));
        let library = Arc::new(PhotoLibrary::with_clock(
            Arc::new(MemoryRecordStore::new()),
            clock,
        ));
        for index in 0..count {
            library
                .insert(format!("data:image/png;base64,{index}"))
                .await
                .unwrap();
        }

        let mut gallery = Gallery::new(library);
        gallery.reload().await.unwrap();
        gallery
    }

    #[tokio::test]
    async fn reload_points_at_newest() {
        let gallery = gallery_with(3).await;
        assert_eq!(gallery.position(), Some(2));
        assert_eq!(gallery.current().unwrap().id, 1_002);
        assert!(gallery.at_end());
        assert!(!gallery.at_start());
    }

    #[tokio::test]
    async fn empty_gallery_has_no_selection() {
        let mut gallery = gallery_with(0).await;
        assert!(gallery.current().is_none());
        assert_eq!(gallery.position(), None);
        assert!(gallery.at_start() && gallery.at_end());

        gallery.prev();
        gallery.next();
        assert_eq!(gallery.position(), None);
    }

    #[tokio::test]
    async fn prev_stops_at_first() {
        let mut gallery = gallery_with(3).await;
        gallery.prev();
        gallery.prev();
        assert_eq!(gallery.position(), Some(0));
        assert!(gallery.at_start());

        gallery.prev();
        assert_eq!(gallery.position(), Some(0));
        assert!(gallery.at_start());
    }

    #[tokio::test]
    async fn next_stops_at_last() {
        let mut gallery = gallery_with(2).await;
        gallery.prev();
        gallery.next();
        assert_eq!(gallery.position(), Some(1));

        gallery.next();
        assert_eq!(gallery.position(), Some(1));
        assert!(gallery.at_end());
    }

    #[tokio::test]
    async fn reload_never_leaves_stale_cursor() {
        let mut gallery = gallery_with(3).await;
        gallery.prev();
        gallery.prev();

        gallery.clear().await.unwrap();
        gallery.reload().await.unwrap();
        assert_eq!(gallery.position(), None);
        assert!(gallery.current().is_none());
    }

    #[tokio::test]
    async fn clear_of_five_empties_everything() {
        let mut gallery = gallery_with(5).await;
        assert_eq!(gallery.len(), 5);

        gallery.clear().await.unwrap();
        assert!(gallery.current().is_none());
        assert!(gallery.is_empty());

        gallery.reload().await.unwrap();
        assert!(gallery.is_empty());
    }

    #[tokio::test]
    async fn select_by_id_and_index() {
        let mut gallery = gallery_with(4).await;
        assert!(gallery.select(1_001));
        assert_eq!(gallery.position(), Some(1));
        assert!(!gallery.select(42));
        assert_eq!(gallery.position(), Some(1));

        assert!(gallery.select_index(0));
        assert!(gallery.at_start());
        assert!(!gallery.select_index(4));
    }
}
