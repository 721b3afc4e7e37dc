//! On-disk cache generations
//!
//! Layout: one directory per generation under the cache root, one JSON file
//! per cached request. Entries are keyed by a SHA256 digest of
//! `"<METHOD> <URL>"` and replaced wholesale on every put.
//!
//! | Path | Content |
//! |------|---------|
//! | `<root>/<generation>/<key>.json` | cached response |
//! | `<root>/<generation>/.installed` | written last by a complete install |
//! | `<root>/.<generation>.installing` | install in progress |
//! | `<root>/.controller` | generation controlling requests |

use crate::error::{CamaraError, CamaraResult};
use crate::offline::request::{ResourceRequest, ResourceResponse};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, warn};

const CONTROLLER_FILE: &str = ".controller";
const INSTALLED_FILE: &str = ".installed";

static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A cached response as persisted on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request method
    pub method: String,
    /// Request URL
    pub url: String,
    /// Response status
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body, base64 encoded
    pub body: String,
}

impl CacheEntry {
    fn from_exchange(request: &ResourceRequest, response: &ResourceResponse) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: base64::engine::general_purpose::STANDARD.encode(&response.body),
        }
    }

    /// Rebuild the response this entry holds
    pub fn to_response(&self) -> CamaraResult<ResourceResponse> {
        let body = base64::engine::general_purpose::STANDARD
            .decode(&self.body)
            .map_err(|e| CamaraError::Internal(format!("corrupt cache entry {}: {e}", self.url)))?;

        Ok(ResourceResponse {
            status: self.status,
            headers: self.headers.clone(),
            body,
        })
    }
}

/// Cache key for a method and URL (first 16 digest bytes, hex)
pub fn entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b" ");
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Reject generation names that are not a single plain directory name
pub fn validate_generation(name: &str) -> CamaraResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(CamaraError::InvalidRequest(format!(
            "invalid cache generation name '{name}'"
        )))
    }
}

/// Set of named cache generations rooted in one directory
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    /// Open (creating if needed) the cache root
    pub async fn open(root: impl Into<PathBuf>) -> CamaraResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| CamaraError::io(format!("creating cache root {}", root.display()), e))?;
        Ok(Self { root })
    }

    fn generation_dir(&self, generation: &str) -> PathBuf {
        self.root.join(generation)
    }

    /// Names of all generations, sorted
    pub async fn keys(&self) -> CamaraResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| CamaraError::io("reading cache root", e))?;

        let mut names = vec![];
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CamaraError::io("reading cache root entry", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if let Some(name) = entry.file_name().to_str() {
                if is_dir && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Whether a generation exists
    pub async fn has(&self, generation: &str) -> bool {
        fs::metadata(self.generation_dir(generation))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Whether a generation was written by a complete install
    pub async fn is_installed(&self, generation: &str) -> bool {
        fs::metadata(self.generation_dir(generation).join(INSTALLED_FILE))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Write a whole generation from `exchanges`, replacing any previous one
    ///
    /// Entries are written into a hidden staging directory, marked installed
    /// and then moved into place. On failure the staging directory is
    /// removed and an existing generation of the same name is untouched.
    pub async fn install(
        &self,
        generation: &str,
        exchanges: &[(ResourceRequest, ResourceResponse)],
    ) -> CamaraResult<()> {
        validate_generation(generation)?;
        let staging = self.root.join(format!(".{generation}.installing"));

        if let Err(e) = self.stage(&staging, exchanges).await {
            discard_dir(&staging).await;
            return Err(e);
        }

        let target = self.generation_dir(generation);
        let replaced = self.root.join(format!(".{generation}.replaced"));
        let had_previous = match fs::rename(&target, &replaced).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                discard_dir(&staging).await;
                return Err(CamaraError::io(
                    format!("replacing cache generation {generation}"),
                    e,
                ));
            }
        };

        if let Err(e) = fs::rename(&staging, &target).await {
            if had_previous {
                let _ = fs::rename(&replaced, &target).await;
            }
            discard_dir(&staging).await;
            return Err(CamaraError::io(
                format!("installing cache generation {generation}"),
                e,
            ));
        }

        if had_previous {
            discard_dir(&replaced).await;
        }
        debug!("Installed {} entries into {}", exchanges.len(), generation);
        Ok(())
    }

    async fn stage(
        &self,
        staging: &Path,
        exchanges: &[(ResourceRequest, ResourceResponse)],
    ) -> CamaraResult<()> {
        discard_dir(staging).await;
        fs::create_dir_all(staging)
            .await
            .map_err(|e| CamaraError::io(format!("creating {}", staging.display()), e))?;

        for (request, response) in exchanges {
            write_entry(staging, request, response).await?;
        }

        fs::write(staging.join(INSTALLED_FILE), b"")
            .await
            .map_err(|e| CamaraError::io(format!("marking {} installed", staging.display()), e))
    }

    /// Create an empty generation if it does not exist yet
    pub async fn create(&self, generation: &str) -> CamaraResult<()> {
        validate_generation(generation)?;
        let dir = self.generation_dir(generation);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CamaraError::io(format!("creating cache generation {generation}"), e))
    }

    /// Delete a generation; returns whether it existed
    pub async fn delete(&self, generation: &str) -> CamaraResult<bool> {
        validate_generation(generation)?;
        match fs::remove_dir_all(self.generation_dir(generation)).await {
            Ok(()) => {
                debug!("Deleted cache generation {}", generation);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CamaraError::io(
                format!("deleting cache generation {generation}"),
                e,
            )),
        }
    }

    /// Store (or replace) the response for a request
    pub async fn put(
        &self,
        generation: &str,
        request: &ResourceRequest,
        response: &ResourceResponse,
    ) -> CamaraResult<()> {
        self.create(generation).await?;
        write_entry(&self.generation_dir(generation), request, response).await?;
        debug!("Cached {} {} in {}", request.method, request.url, generation);
        Ok(())
    }

    /// Exact-match lookup by method and URL
    ///
    /// Unreadable entries count as a miss; the next put replaces them.
    pub async fn lookup(
        &self,
        generation: &str,
        method: &str,
        url: &str,
    ) -> CamaraResult<Option<ResourceResponse>> {
        let path = self
            .generation_dir(generation)
            .join(format!("{}.json", entry_key(method, url)));

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CamaraError::io(format!("reading cache entry for {url}"), e)),
        };

        let entry: CacheEntry = match serde_json::from_slice(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        if entry.method != method || entry.url != url {
            warn!("Cache key collision for {} {}", method, url);
            return Ok(None);
        }

        match entry.to_response() {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Every entry in a generation, sorted by URL
    pub async fn entries(&self, generation: &str) -> CamaraResult<Vec<CacheEntry>> {
        let dir = self.generation_dir(generation);
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CamaraError::io(format!("reading cache generation {generation}"), e)),
        };

        let mut entries = vec![];
        while let Some(item) = reader
            .next_entry()
            .await
            .map_err(|e| CamaraError::io("reading cache entry", e))?
        {
            let path = item.path();
            let name = item.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || !name.ends_with(".json") {
                continue;
            }

            let content = fs::read(&path)
                .await
                .map_err(|e| CamaraError::io(format!("reading {}", path.display()), e))?;
            match serde_json::from_slice::<CacheEntry>(&content) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable cache entry {}: {}", path.display(), e),
            }
        }

        entries.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(entries)
    }

    /// Generation currently controlling requests, if any
    pub async fn controller(&self) -> CamaraResult<Option<String>> {
        match fs::read_to_string(self.root.join(CONTROLLER_FILE)).await {
            Ok(content) => {
                let name = content.trim();
                Ok((!name.is_empty()).then(|| name.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CamaraError::io("reading cache controller marker", e)),
        }
    }

    /// Record which generation controls requests
    pub async fn set_controller(&self, generation: &str) -> CamaraResult<()> {
        validate_generation(generation)?;
        fs::write(self.root.join(CONTROLLER_FILE), generation)
            .await
            .map_err(|e| CamaraError::io("writing cache controller marker", e))
    }

    /// Forget the controlling generation
    pub async fn clear_controller(&self) -> CamaraResult<()> {
        match fs::remove_file(self.root.join(CONTROLLER_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CamaraError::io("removing cache controller marker", e)),
        }
    }
}

async fn write_entry(
    dir: &Path,
    request: &ResourceRequest,
    response: &ResourceResponse,
) -> CamaraResult<()> {
    let entry = CacheEntry::from_exchange(request, response);
    let key = entry_key(&entry.method, &entry.url);
    let path = dir.join(format!("{key}.json"));
    let tmp = dir.join(format!(
        ".{key}.{}.{}.tmp",
        std::process::id(),
        TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    ));

    let content = serde_json::to_vec(&entry)?;
    fs::write(&tmp, content)
        .await
        .map_err(|e| CamaraError::io(format!("writing cache entry for {}", entry.url), e))?;

    // Rename is atomic per key; concurrent puts of one key keep the last
    if let Err(e) = fs::rename(&tmp, &path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CamaraError::io(
            format!("storing cache entry for {}", entry.url),
            e,
        ));
    }
    Ok(())
}

async fn discard_dir(dir: &Path) {
    match fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", dir.display(), e),
    }
}
