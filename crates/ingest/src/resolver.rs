// ABOUTME: Source resolver that turns a user URL into the feed URL to ingest.
// ABOUTME: Catalog page URLs go through the catalog lookup; failures follow the CatalogPolicy.

use std::sync::Arc;

use podscrape_feed::{classify_url, ResolvedSource, SourceUrl};
use tracing::{info, warn};

use crate::catalog::CatalogLookup;
use crate::error::IngestError;
use crate::options::CatalogPolicy;

const OP: &str = "ResolveCatalog";

#[derive(Clone)]
pub struct Resolver {
    catalog: Arc<dyn CatalogLookup>,
    policy: CatalogPolicy,
}

impl Resolver {
    pub fn new(catalog: Arc<dyn CatalogLookup>, policy: CatalogPolicy) -> Self {
        Self { catalog, policy }
    }

    /// Resolves a user URL to the feed to ingest.
    ///
    /// Non-catalog URLs are feed URLs as-is. With [`CatalogPolicy::FallBackToUrl`]
    /// an unresolvable catalog URL is also used as-is; with
    /// [`CatalogPolicy::Fail`] it is an error.
    pub async fn resolve(&self, user_url: &str) -> Result<ResolvedSource, IngestError> {
        let failure = match classify_url(user_url) {
            SourceUrl::Feed => return Ok(ResolvedSource::direct(user_url)),
            SourceUrl::MalformedCatalog => no_catalog_id(user_url),
            SourceUrl::Catalog(catalog_ref) => {
                info!(url = user_url, podcast_id = catalog_ref.podcast_id, "catalog URL detected");
                match self.catalog.lookup(catalog_ref.podcast_id).await {
                    Ok(Some(entry)) => {
                        info!(url = user_url, feed_url = %entry.feed_url, "catalog resolved feed URL");
                        return Ok(ResolvedSource::from_catalog(entry));
                    }
                    Ok(None) => IngestError::catalog(
                        user_url,
                        OP,
                        Some(anyhow::anyhow!("catalog has no feed URL for this podcast")),
                    ),
                    Err(err) => err,
                }
            }
        };

        match self.policy {
            CatalogPolicy::FallBackToUrl => {
                warn!(url = user_url, error = %failure, "catalog resolution failed; using URL as feed URL");
                Ok(ResolvedSource::direct(user_url))
            }
            CatalogPolicy::Fail => Err(failure),
        }
    }
}

fn no_catalog_id(user_url: &str) -> IngestError {
    IngestError::catalog(
        user_url,
        OP,
        Some(anyhow::anyhow!("invalid podcast URL: no catalog id")),
    )
}
