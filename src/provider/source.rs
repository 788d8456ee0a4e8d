//! Live city API access
//!
//! `RemoteSource` is the seam the provider fetches through. `HttpSource`
//! talks to the real API; tests swap in an in-memory source.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::core::config::ProviderConfig;
use crate::core::error::{CourierError, Result};

/// Something that can hand back JSON documents for API endpoints
#[allow(async_fn_in_trait)]
pub trait RemoteSource {
    /// Fetch the document at `endpoint` (relative to the API root)
    async fn get_json(&self, endpoint: &str) -> Result<Value>;

    /// Whether the API answers its health check
    async fn healthy(&self) -> bool;
}

/// reqwest-backed source with a per-request time bound
pub struct HttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client: Client::new(),
            base_url,
            timeout,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn fetch(&self, endpoint: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| CourierError::Fetch {
                resource: endpoint.into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CourierError::Fetch {
                resource: endpoint.into(),
                reason: format!("status {}", response.status()),
            });
        }

        response.json().await.map_err(|e| CourierError::Fetch {
            resource: endpoint.into(),
            reason: e.to_string(),
        })
    }
}

impl RemoteSource for HttpSource {
    async fn get_json(&self, endpoint: &str) -> Result<Value> {
        match tokio::time::timeout(self.timeout, self.fetch(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(CourierError::Timeout(endpoint.into())),
        }
    }

    async fn healthy(&self) -> bool {
        let probe = self.client.get(self.url("healthz")).send();
        match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(response)) => response.status().is_success(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_with_single_slash() {
        let source = HttpSource::new("http://localhost:8080", Duration::from_secs(1));
        assert_eq!(source.url("city/map"), "http://localhost:8080/city/map");
        assert_eq!(source.url("/healthz"), "http://localhost:8080/healthz");
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_without_panicking() {
        // port 9 (discard) on loopback refuses or times out quickly
        let source = HttpSource::new("http://127.0.0.1:9/", Duration::from_millis(500));
        assert!(source.get_json("city/map").await.is_err());
        assert!(!source.healthy().await);
    }
}
