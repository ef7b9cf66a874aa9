// ABOUTME: Feed fetching over HTTP with scheme validation, status checks, and a body size cap.
// ABOUTME: FeedFetcher is the seam the ingestor uses; HttpFeedFetcher is the reqwest implementation.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::error::IngestError;

/// Maximum accepted feed size (20 MB). Large back catalogs run to several MB.
pub const MAX_FEED_BYTES: usize = 20 * 1024 * 1024;

/// Fetches raw feed bytes. No caching; non-2xx and network failures are errors.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, IngestError>;
}

/// Checks that a URL is absolute http(s).
pub fn validate_http_url(url: &str, op: &str) -> Result<url::Url, IngestError> {
    if url.is_empty() {
        return Err(IngestError::invalid_url(url, op, None));
    }
    let parsed = url::Url::parse(url).map_err(|e| {
        IngestError::invalid_url(url, op, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(IngestError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFeedFetcher {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, IngestError> {
        const OP: &str = "FetchFeed";
        validate_http_url(url, OP)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::from_reqwest(url, OP, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::fetch(
                url,
                OP,
                Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
            ));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(IngestError::fetch(
                    url,
                    OP,
                    Some(anyhow::anyhow!("feed too large: {} bytes", len)),
                ));
            }
        }

        // Content-Length can be absent or wrong, so the cap is enforced while reading.
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| IngestError::from_reqwest(url, OP, e))?;
            if body.len() + chunk.len() > self.max_bytes {
                return Err(IngestError::fetch(
                    url,
                    OP,
                    Some(anyhow::anyhow!("feed too large")),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = body.len(), "fetched feed");
        Ok(Bytes::from(body))
    }
}
