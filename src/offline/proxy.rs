//! Offline cache proxy
//!
//! Sits between the application and the network. Lifecycle:
//!
//! ```text
//! Parsed -> Installing -> Installed -> Activating -> Activated
//!               \-> Redundant (install failed)
//! ```
//!
//! Once activated, every request is answered from the active generation
//! first, then from the network. Successful GET responses are written back
//! into the cache. Offline document navigations fall back to the cached
//! entry point.

use crate::config::OfflineConfig;
use crate::error::{CamaraError, CamaraResult};
use crate::offline::network::Fetcher;
use crate::offline::request::{Destination, ResourceRequest, ResourceResponse};
use crate::offline::storage::{validate_generation, CacheStorage};
use futures_util::future::try_join_all;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Lifecycle state of the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyState {
    /// Configured, not installed in this process
    Parsed,
    /// Fetching manifest assets
    Installing,
    /// Every asset stored, not yet controlling requests
    Installed,
    /// Purging older generations
    Activating,
    /// Answering requests from the cache
    Activated,
    /// Install failed; never controls requests
    Redundant,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        write!(f, "{}", name)
    }
}

/// Where a proxied response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Active cache generation
    Cache,
    /// Network, proxy active
    Network,
    /// Cached entry point served for an offline navigation
    Fallback,
    /// Network, proxy not yet controlling requests
    Passthrough,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cache => "cache",
            Self::Network => "network",
            Self::Fallback => "fallback",
            Self::Passthrough => "passthrough",
        };
        write!(f, "{}", name)
    }
}

/// Response returned by [`OfflineProxy::handle`]
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// The response itself
    pub response: ResourceResponse,
    /// Where it came from
    pub source: ResponseSource,
}

/// Snapshot of proxy and cache state
#[derive(Debug, Clone, Serialize)]
pub struct ProxyStatus {
    /// Lifecycle state
    pub state: ProxyState,
    /// Configured generation
    pub generation: String,
    /// Whether requests are answered from the cache
    pub controlling: bool,
    /// Every generation on disk, sorted
    pub generations: Vec<String>,
    /// Entries in the configured generation
    pub entries: usize,
    /// Origin the manifest resolves against
    pub origin: String,
}

/// Resolved proxy settings
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Base URL the manifest is resolved against
    pub origin: Url,
    /// Active cache generation name
    pub generation: String,
    /// Precache manifest, relative to `origin`
    pub assets: Vec<String>,
    /// Document served for offline navigations, relative to `origin`
    pub entry_point: String,
}

impl ProxySettings {
    /// Build settings from the `[offline]` config section
    pub fn from_config(config: &OfflineConfig) -> CamaraResult<Self> {
        let mut origin = Url::parse(&config.origin).map_err(|e| {
            CamaraError::InvalidRequest(format!("invalid offline.origin '{}': {e}", config.origin))
        })?;
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        validate_generation(&config.generation)?;

        Ok(Self {
            origin,
            generation: config.generation.clone(),
            assets: config.assets.clone(),
            entry_point: config.entry_point.clone(),
        })
    }
}

/// Cache-first request interceptor
pub struct OfflineProxy {
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    settings: ProxySettings,
    state: ProxyState,
}

impl OfflineProxy {
    /// Create a proxy, resuming control if this generation was already activated
    pub async fn new(
        storage: CacheStorage,
        fetcher: Arc<dyn Fetcher>,
        settings: ProxySettings,
    ) -> CamaraResult<Self> {
        let controlling = storage.controller().await?.as_deref() == Some(&settings.generation)
            && storage.is_installed(&settings.generation).await;

        let state = if controlling {
            ProxyState::Activated
        } else {
            ProxyState::Parsed
        };
        debug!("Offline proxy for {} starts {}", settings.generation, state);

        Ok(Self {
            storage,
            fetcher,
            settings,
            state,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProxyState {
        self.state
    }

    /// Proxy settings
    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    /// Resolve a manifest path against the origin
    pub fn resolve(&self, path: &str) -> CamaraResult<Url> {
        self.settings
            .origin
            .join(path)
            .map_err(|e| CamaraError::InvalidRequest(format!("invalid path '{path}': {e}")))
    }

    /// Precache every manifest asset into the current generation
    pub async fn install(&mut self) -> CamaraResult<usize> {
        self.install_with_progress(&|_: &str| {}).await
    }

    /// Like [`OfflineProxy::install`], calling `on_asset` as each asset arrives
    ///
    /// All-or-nothing: if any asset fails to download or answers with a
    /// non-2xx status, nothing is stored and the proxy becomes redundant.
    pub async fn install_with_progress(
        &mut self,
        on_asset: &(dyn Fn(&str) + Send + Sync),
    ) -> CamaraResult<usize> {
        self.state = ProxyState::Installing;
        info!(
            "Installing {} asset(s) into {}",
            self.settings.assets.len(),
            self.settings.generation
        );

        let requests = match self
            .settings
            .assets
            .iter()
            .map(|path| self.resolve(path).map(ResourceRequest::get))
            .collect::<CamaraResult<Vec<_>>>()
        {
            Ok(requests) => requests,
            Err(e) => {
                self.state = ProxyState::Redundant;
                return Err(e);
            }
        };

        let fetcher = Arc::clone(&self.fetcher);
        let fetched = try_join_all(requests.iter().map(|request| {
            let fetcher = Arc::clone(&fetcher);
            async move {
                let response = fetcher.fetch(request).await?;
                if !response.is_success() {
                    return Err(CamaraError::AssetRejected {
                        url: request.url.to_string(),
                        status: response.status,
                    });
                }
                on_asset(request.url.as_str());
                Ok(response)
            }
        }))
        .await;

        let responses = match fetched {
            Ok(responses) => responses,
            Err(e) => {
                warn!("Install of {} failed: {}", self.settings.generation, e);
                self.state = ProxyState::Redundant;
                return Err(e);
            }
        };

        let count = responses.len();
        let exchanges: Vec<_> = requests.into_iter().zip(responses).collect();
        let generation = self.settings.generation.clone();
        if let Err(e) = self.storage.install(&generation, &exchanges).await {
            warn!("Install of {} failed: {}", generation, e);
            self.state = ProxyState::Redundant;
            return Err(e);
        }

        // Installed proxies take over without waiting for older ones to go idle
        self.state = ProxyState::Installed;
        info!("Installed {} asset(s) into {}", count, generation);
        Ok(count)
    }

    /// Purge every other generation and take control of requests
    ///
    /// Returns the names of purged generations.
    pub async fn activate(&mut self) -> CamaraResult<Vec<String>> {
        let generation = self.settings.generation.clone();
        if !self.storage.is_installed(&generation).await {
            return Err(CamaraError::InvalidRequest(format!(
                "cache generation {generation} is not installed. Run: camara cache install"
            )));
        }

        self.state = ProxyState::Activating;
        let mut purged = vec![];
        for name in self.storage.keys().await? {
            if name != generation {
                self.storage.delete(&name).await?;
                info!("Purged cache generation {}", name);
                purged.push(name);
            }
        }

        self.storage.set_controller(&generation).await?;
        self.state = ProxyState::Activated;
        info!("Cache generation {} is now controlling requests", generation);
        Ok(purged)
    }

    /// Install and activate unless this generation already controls requests
    pub async fn ensure_active(&mut self) -> CamaraResult<()> {
        if self.state == ProxyState::Activated {
            return Ok(());
        }
        if !self.storage.is_installed(&self.settings.generation).await {
            self.install().await?;
        }
        self.activate().await?;
        Ok(())
    }

    /// Answer a request
    pub async fn handle(&self, request: &ResourceRequest) -> CamaraResult<ProxyResponse> {
        if self.state != ProxyState::Activated {
            let response = self.fetcher.fetch(request).await?;
            return Ok(ProxyResponse {
                response,
                source: ResponseSource::Passthrough,
            });
        }

        let generation = &self.settings.generation;
        if let Some(response) = self
            .storage
            .lookup(generation, &request.method, request.url.as_str())
            .await?
        {
            debug!("Cache hit {} {}", request.method, request.url);
            return Ok(ProxyResponse {
                response,
                source: ResponseSource::Cache,
            });
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if request.is_get() && response.is_success() {
                    // Write-back failures only cost a future cache hit
                    if let Err(e) = self.storage.put(generation, request, &response).await {
                        warn!("Failed to cache {}: {}", request.url, e);
                    }
                }
                Ok(ProxyResponse {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e @ CamaraError::NetworkUnavailable { .. })
                if request.destination == Destination::Document =>
            {
                let entry = self.resolve(&self.settings.entry_point)?;
                match self.storage.lookup(generation, "GET", entry.as_str()).await? {
                    Some(response) => {
                        info!("Offline: serving {} for {}", entry, request.url);
                        Ok(ProxyResponse {
                            response,
                            source: ResponseSource::Fallback,
                        })
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Drop every generation and release control of requests
    pub async fn clear(&mut self) -> CamaraResult<Vec<String>> {
        let mut removed = vec![];
        for name in self.storage.keys().await? {
            self.storage.delete(&name).await?;
            removed.push(name);
        }
        self.storage.clear_controller().await?;
        self.state = ProxyState::Parsed;
        Ok(removed)
    }

    /// Current state and cache contents
    pub async fn status(&self) -> CamaraResult<ProxyStatus> {
        let generation = self.settings.generation.clone();
        let entries = self.storage.entries(&generation).await?.len();

        Ok(ProxyStatus {
            state: self.state,
            controlling: self.state == ProxyState::Activated,
            generations: self.storage.keys().await?,
            entries,
            origin: self.settings.origin.to_string(),
            generation,
        })
    }
}
