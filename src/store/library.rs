//! Photo library: id assignment on top of a record store

use crate::error::{CamaraError, CamaraResult};
use crate::store::backend::RecordStore;
use crate::store::record::PhotoRecord;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Source of the current time in Unix milliseconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall clock used outside tests
pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp_millis())
}

/// Append-only photo collection
pub struct PhotoLibrary {
    store: Arc<dyn RecordStore>,
    clock: Clock,
    last_id: Mutex<Option<i64>>,
}

impl PhotoLibrary {
    /// Create a library over `store` using the wall clock
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(store, system_clock())
    }

    /// Create a library with an injected clock
    pub fn with_clock(store: Arc<dyn RecordStore>, clock: Clock) -> Self {
        Self {
            store,
            clock,
            last_id: Mutex::new(None),
        }
    }

    /// Where records are kept
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Persist a new photo and return the stored record
    ///
    /// The id is the current timestamp; if the clock has not moved past the
    /// newest existing id, the next free id is used instead so ids stay
    /// unique and never decrease.
    pub async fn insert(&self, image: impl Into<String>) -> CamaraResult<PhotoRecord> {
        let mut last_id = self.last_id.lock().await;

        let newest = match *last_id {
            Some(id) => Some(id),
            None => self.store.get_all().await?.last().map(|r| r.id),
        };

        let now = (self.clock)();
        let id = match newest {
            Some(newest) if now <= newest => newest + 1,
            _ => now,
        };

        let record = PhotoRecord {
            id,
            image: image.into(),
        };
        self.store.put(&record).await?;
        *last_id = Some(id);

        info!("Stored photo {} in {}", id, self.store.location());
        Ok(record)
    }

    /// Snapshot of every photo, ascending by id
    pub async fn list_all(&self) -> CamaraResult<Vec<PhotoRecord>> {
        let mut records = self.store.get_all().await?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    /// Look up one photo by id
    pub async fn get(&self, id: i64) -> CamaraResult<PhotoRecord> {
        self.list_all()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(CamaraError::PhotoNotFound(id))
    }

    /// Delete every photo. Irreversible.
    pub async fn clear_all(&self) -> CamaraResult<()> {
        let mut last_id = self.last_id.lock().await;
        self.store.clear().await?;
        *last_id = None;
        info!("Cleared all photos in {}", self.store.location());
        Ok(())
    }
}
