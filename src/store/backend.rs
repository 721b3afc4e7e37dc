//! Keyed record storage backends
//!
//! The photo library only needs put-by-id, get-all and clear-all. Each
//! backend guarantees that a failed operation leaves the previous contents
//! untouched.

use crate::error::{CamaraError, CamaraResult};
use crate::store::record::PhotoRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable keyed record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one record under its id
    async fn put(&self, record: &PhotoRecord) -> CamaraResult<()>;

    /// Every persisted record, ascending by id
    async fn get_all(&self) -> CamaraResult<Vec<PhotoRecord>>;

    /// Delete every record
    async fn clear(&self) -> CamaraResult<()>;

    /// Human-readable location for display
    fn location(&self) -> String;
}

/// Directory-backed store, one JSON file per record
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Open (creating if needed) the store directory
    ///
    /// # Errors
    /// Returns [`CamaraError::StorageUnavailable`] when the directory cannot
    /// be created or written to.
    pub async fn open(dir: impl Into<PathBuf>) -> CamaraResult<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CamaraError::storage(&dir, e))?;

        let probe = dir.join(".probe");
        fs::write(&probe, b"")
            .await
            .map_err(|e| CamaraError::storage(&dir, format!("not writable: {e}")))?;
        fs::remove_file(&probe)
            .await
            .map_err(|e| CamaraError::storage(&dir, e))?;

        debug!("Photo store opened at {}", dir.display());
        Ok(Self { dir })
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Record files in the store directory. Anything that is not a visible
    /// `*.json` file is left alone.
    async fn record_files(&self) -> CamaraResult<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CamaraError::storage(&self.dir, e)),
        };

        let mut paths = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CamaraError::storage(&self.dir, e))?
        {
            let path = entry.path();
            if is_record(&path) {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

fn is_record(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
        && !path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'))
}

fn staged_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("record");
    path.with_file_name(format!(".{name}.clearing"))
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn put(&self, record: &PhotoRecord) -> CamaraResult<()> {
        let path = self.record_path(record.id);
        let tmp = self.dir.join(format!(".{}.json.tmp", record.id));
        let content = serde_json::to_vec(record)?;

        fs::write(&tmp, content)
            .await
            .map_err(|e| CamaraError::storage(&path, e))?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CamaraError::storage(&path, e));
        }

        debug!("Persisted photo {} ({} bytes)", record.id, record.payload_len());
        Ok(())
    }

    async fn get_all(&self) -> CamaraResult<Vec<PhotoRecord>> {
        let mut records = vec![];
        for path in self.record_files().await? {
            let content = fs::read(&path)
                .await
                .map_err(|e| CamaraError::storage(&path, e))?;
            match serde_json::from_slice::<PhotoRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn clear(&self) -> CamaraResult<()> {
        let records = self.record_files().await?;

        // Hidden staged names are invisible to get_all and can be renamed back
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(records.len());
        for path in records {
            let hidden = staged_path(&path);
            if let Err(e) = fs::rename(&path, &hidden).await {
                for (original, hidden) in staged.iter().rev() {
                    if let Err(e) = fs::rename(hidden, original).await {
                        warn!("Failed to restore {}: {}", original.display(), e);
                    }
                }
                return Err(CamaraError::storage(&path, e));
            }
            staged.push((path, hidden));
        }

        for (_, hidden) in &staged {
            if let Err(e) = fs::remove_file(hidden).await {
                warn!("Failed to remove cleared photo {}: {}", hidden.display(), e);
            }
        }

        debug!("Cleared {} photo(s) at {}", staged.len(), self.dir.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<BTreeMap<i64, PhotoRecord>>,
    failing: bool,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose medium can never be opened
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            failing: true,
        }
    }

    fn check(&self) -> CamaraResult<()> {
        if self.failing {
            return Err(CamaraError::storage("memory", "storage disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, record: &PhotoRecord) -> CamaraResult<()> {
        self.check()?;
        self.records.lock().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_all(&self) -> CamaraResult<Vec<PhotoRecord>> {
        self.check()?;
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn clear(&self) -> CamaraResult<()> {
        self.check()?;
        self.records.lock().await.clear();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
