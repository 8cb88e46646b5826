//! Delivery primitives and transport errors

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while preparing or delivering an event
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Metadata must serialize to a JSON object, got {0}")]
    InvalidMetadata(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No async runtime available for fallback delivery")]
    NoRuntime,

    #[error("Beacon rejected by host")]
    Rejected,
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Asynchronous network call used when no beacon is available
#[async_trait]
pub trait HttpPoster: Send + Sync {
    /// POST a JSON body; the response status is not inspected
    async fn post_json(&self, url: &str, body: Vec<u8>) -> TransportResult<()>;
}

/// [`HttpPoster`] backed by a shared `reqwest` client
#[derive(Debug, Clone, Default)]
pub struct ReqwestPoster {
    client: reqwest::Client,
}

impl ReqwestPoster {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpPoster for ReqwestPoster {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> TransportResult<()> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, super::JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        tracing::trace!(status = %response.status(), "analytics post completed");
        Ok(())
    }
}
