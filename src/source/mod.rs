//! Data source abstraction for the hardware monitoring endpoint.
//!
//! This module provides a trait-based abstraction over the service that
//! exposes live sensor readings, so the poll loop can be driven against
//! an in-memory fake in tests while production uses HTTP.

mod http;
mod snapshot;

pub use http::HttpSource;
pub use snapshot::{HwInfoSection, Reading, ReadingValue, SensorSnapshot};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from talking to the monitoring source.
///
/// The distinction matters to the poll loop: an offline source is shown on
/// the display, while a malformed answer only abandons the current tick.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached (connection refused or timed out).
    #[error("monitoring source offline: {0}")]
    Offline(String),

    /// The source answered, but not with anything usable.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            SourceError::Offline(err.to_string())
        } else {
            SourceError::Malformed(err.to_string())
        }
    }
}

/// Trait for fetching sensor readings from a monitoring source.
#[async_trait]
pub trait ReadingsSource: Send + Sync {
    /// Fetch the complete reading list.
    ///
    /// Used once per process, to resolve sensor labels to entry indices.
    async fn scan(&self) -> Result<SensorSnapshot, SourceError>;

    /// Fetch only the readings for the given entry indices.
    ///
    /// The response carries the requested readings in entry-index order,
    /// so callers address them by rank rather than raw index.
    async fn fetch(&self, entry_indices: &[u32]) -> Result<SensorSnapshot, SourceError>;

    /// Returns a human-readable description of the source, for logs.
    fn description(&self) -> &str;
}
