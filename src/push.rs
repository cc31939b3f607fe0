//! Publishing frame payloads to the display.
//!
//! The push is fire-and-forget: a payload that cannot be delivered is
//! logged and dropped. The next tick builds a fresh one, so there is
//! nothing to queue or retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::frames::FramePayload;

/// Timeout for the push POST. The display is on the local network; if it
/// does not answer quickly it will not answer at all.
const PUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Header carrying the LaMetric app access token.
const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Trait for delivering frame payloads to a display.
///
/// Delivery failures are the sink's problem: implementations log and
/// swallow them, so the poll loop never stalls on a flaky display.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Push a payload to the display.
    async fn push(&self, payload: &FramePayload);

    /// Returns a human-readable description of the sink, for logs.
    fn description(&self) -> &str;
}

/// Pushes payloads to a LaMetric Time device's local push API.
pub struct LaMetricSink {
    client: Client,
    url: Url,
    token: String,
    description: String,
}

impl LaMetricSink {
    /// Create a sink for the given push URL and app access token.
    pub fn new(url: Url, token: &str) -> Result<Self, reqwest::Error> {
        // The device serves its local push API over HTTPS with a
        // certificate that no system store trusts.
        let client = Client::builder()
            .timeout(PUSH_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()?;

        let description = format!("lametric: {}", url);
        Ok(Self {
            client,
            url,
            token: token.to_string(),
            description,
        })
    }
}

#[async_trait]
impl FrameSink for LaMetricSink {
    async fn push(&self, payload: &FramePayload) {
        let result = self
            .client
            .post(self.url.clone())
            .header(header::ACCEPT, "application/json")
            .header(ACCESS_TOKEN_HEADER, &self.token)
            .header(header::CACHE_CONTROL, "no-cache")
            .json(payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(frames = payload.frames.len(), "pushed frames to display");
            }
            Ok(response) => {
                warn!(status = %response.status(), "display rejected push");
            }
            Err(err) if err.is_timeout() || err.is_connect() => {
                warn!("unable to reach display, check your connection: {}", err);
            }
            Err(err) => {
                warn!("push failed: {}", err);
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Debug for LaMetricSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaMetricSink").field("url", &self.url.as_str()).finish()
    }
}
