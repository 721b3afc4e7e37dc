//! Offline cache proxy
//!
//! Makes the application shell available without a network:
//! - `storage`: named cache generations on disk
//! - `network`: the `Fetcher` seam and its HTTP implementation
//! - `proxy`: install/activate lifecycle and cache-first request handling

mod network;
mod proxy;
mod request;
mod storage;

pub use network::{Fetcher, HttpFetcher};
pub use proxy::{
    OfflineProxy, ProxyResponse, ProxySettings, ProxyState, ProxyStatus, ResponseSource,
};
pub use request::{Destination, ResourceRequest, ResourceResponse};
pub use storage::{entry_key, CacheEntry, CacheStorage};
