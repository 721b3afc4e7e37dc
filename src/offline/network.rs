//! Network access for the offline proxy

use crate::error::{CamaraError, CamaraResult};
use crate::offline::request::{ResourceRequest, ResourceResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Performs requests against the network
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request. Transport failures are `NetworkUnavailable`;
    /// any HTTP status (including 4xx/5xx) is a successful fetch.
    async fn fetch(&self, request: &ResourceRequest) -> CamaraResult<ResourceResponse>;
}

/// Blocking HTTP client run on the blocking thread pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher. `None` waits for the network indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &ResourceRequest) -> CamaraResult<ResourceResponse> {
        let agent = self.agent.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || send(&agent, &request))
            .await
            .map_err(|e| CamaraError::Internal(format!("fetch task failed: {e}")))?
    }
}

fn send(agent: &ureq::Agent, request: &ResourceRequest) -> CamaraResult<ResourceResponse> {
    let url = request.url.as_str();
    let body = request.body.as_slice();
    debug!("{} {}", request.method, url);

    let result = match request.method.as_str() {
        "GET" => agent.get(url).call(),
        "HEAD" => agent.head(url).call(),
        "DELETE" => agent.delete(url).call(),
        "POST" => agent.post(url).send(body),
        "PUT" => agent.put(url).send(body),
        "PATCH" => agent.patch(url).send(body),
        other => {
            return Err(CamaraError::InvalidRequest(format!(
                "unsupported HTTP method {other}"
            )))
        }
    };

    let mut response = result.map_err(|e| CamaraError::network(url, e))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| CamaraError::network(url, e))?;

    debug!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());
    Ok(ResourceResponse {
        status,
        headers,
        body,
    })
}
