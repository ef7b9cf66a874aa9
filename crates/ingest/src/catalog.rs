// ABOUTME: Catalog lookup that maps an Apple Podcasts id to the show's feed URL.
// ABOUTME: ItunesLookup queries the public iTunes lookup endpoint and takes the first result.

use async_trait::async_trait;
use podscrape_feed::CatalogEntry;
use serde::Deserialize;

use crate::error::IngestError;

pub const ITUNES_LOOKUP_URL: &str = "https://itunes.apple.com/lookup";

/// Resolves a numeric catalog id. `Ok(None)` means the catalog has no usable entry.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn lookup(&self, podcast_id: u64) -> Result<Option<CatalogEntry>, IngestError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    feed_url: Option<String>,
    collection_id: Option<u64>,
    kind: Option<String>,
    track_count: Option<u64>,
}

impl LookupResult {
    fn into_entry(self) -> Option<CatalogEntry> {
        let feed_url = self.feed_url.filter(|u| !u.trim().is_empty())?;
        Some(CatalogEntry {
            feed_url,
            collection_id: self.collection_id,
            kind: self.kind,
            track_count: self.track_count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ItunesLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl ItunesLookup {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CatalogLookup for ItunesLookup {
    async fn lookup(&self, podcast_id: u64) -> Result<Option<CatalogEntry>, IngestError> {
        const OP: &str = "CatalogLookup";
        let id = podcast_id.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id", id.as_str()), ("entity", "podcast")])
            .send()
            .await
            .map_err(|e| IngestError::from_reqwest(&self.endpoint, OP, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::catalog(
                &self.endpoint,
                OP,
                Some(anyhow::anyhow!("HTTP status {} for id {}", status.as_u16(), id)),
            ));
        }

        let body: LookupResponse = response.json().await.map_err(|e| {
            IngestError::catalog(&self.endpoint, OP, Some(anyhow::Error::new(e)))
        })?;

        let entry = body.results.into_iter().next().and_then(LookupResult::into_entry);
        tracing::debug!(podcast_id, found = entry.is_some(), "catalog lookup");
        Ok(entry)
    }
}
