//! CLI command implementations

pub mod cache;
pub mod capture;
pub mod completions;
pub mod config;
pub mod download;
pub mod gallery;

pub use cache::execute as cache;
pub use capture::execute as capture;
pub use completions::execute as completions;
pub use config::execute as config;
pub use download::execute as download;
pub use gallery::execute as gallery;

use crate::config::{Config, DataPaths};
use crate::error::CamaraResult;
use crate::offline::{CacheStorage, HttpFetcher, OfflineProxy, ProxySettings};
use crate::store::{FileRecordStore, PhotoLibrary};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Open the photo library in the resolved photos directory
pub(crate) async fn open_library(paths: &DataPaths) -> CamaraResult<Arc<PhotoLibrary>> {
    let store = FileRecordStore::open(&paths.photos).await?;
    Ok(Arc::new(PhotoLibrary::new(Arc::new(store))))
}

/// Open the offline proxy over the resolved cache directory
pub(crate) async fn open_proxy(config: &Config, paths: &DataPaths) -> CamaraResult<OfflineProxy> {
    let settings = ProxySettings::from_config(&config.offline)?;
    let storage = CacheStorage::open(&paths.offline).await?;
    let fetcher = HttpFetcher::new(config.offline.timeout_secs.map(Duration::from_secs));
    OfflineProxy::new(storage, Arc::new(fetcher), settings).await
}

/// Directory downloads go to: explicit flag, then config, then cwd
pub(crate) fn download_dir(output: Option<PathBuf>, config: &Config) -> PathBuf {
    output
        .or_else(|| config.download.dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}
