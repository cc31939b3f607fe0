//! HTTP data source for HWiNFO's remote monitoring endpoint.
//!
//! HWiNFO serves the full reading list at `/json.json`; appending
//! `?enable=<indices>` restricts the response to the named entries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{ReadingsSource, SensorSnapshot, SourceError};

/// Timeout for the one-off full scan. The unrestricted reading list can be
/// large on machines with many sensors.
const SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the per-tick restricted fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// A data source that polls HWiNFO's remote monitoring HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: Url,
    description: String,
}

impl HttpSource {
    /// Create a source for the given endpoint URL (`http://host:port/json.json`).
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        // The endpoint is a machine on the local network; it may serve a
        // self-signed certificate when proxied through TLS.
        let client = Client::builder().danger_accept_invalid_certs(true).build()?;
        let description = format!("hwinfo: {}", endpoint);
        Ok(Self {
            client,
            endpoint,
            description,
        })
    }

    /// The endpoint URL restricted to the given entry indices.
    fn restricted_url(&self, entry_indices: &[u32]) -> Url {
        let enable = entry_indices
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.endpoint.clone();
        url.set_query(Some(&format!("enable={}", enable)));
        url
    }

    async fn get(&self, url: Url, timeout: Duration) -> Result<SensorSnapshot, SourceError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Malformed(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let snapshot = response.json::<SensorSnapshot>().await?;
        Ok(snapshot)
    }
}

#[async_trait]
impl ReadingsSource for HttpSource {
    async fn scan(&self) -> Result<SensorSnapshot, SourceError> {
        self.get(self.endpoint.clone(), SCAN_TIMEOUT).await
    }

    async fn fetch(&self, entry_indices: &[u32]) -> Result<SensorSnapshot, SourceError> {
        self.get(self.restricted_url(entry_indices), FETCH_TIMEOUT).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}
