// ABOUTME: Configuration options for ingestion including CatalogPolicy, IngestOptions, and IngestorBuilder.
// ABOUTME: IngestorBuilder provides a fluent API for wiring the resolver, fetcher, and store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogLookup, ItunesLookup, ITUNES_LOOKUP_URL};
use crate::error::IngestError;
use crate::fetch::{FeedFetcher, HttpFeedFetcher, MAX_FEED_BYTES};
use crate::ingestor::Ingestor;
use crate::resolver::Resolver;
use crate::store::ShowStore;

/// What to do when a catalog URL cannot be turned into a feed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogPolicy {
    /// Log the failure and use the user's URL as a literal feed URL.
    #[default]
    FallBackToUrl,
    /// Fail the ingestion with a Catalog error.
    Fail,
}

impl fmt::Display for CatalogPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogPolicy::FallBackToUrl => "fallback",
            CatalogPolicy::Fail => "fail",
        };
        write!(f, "{}", s)
    }
}

/// Configuration options for the ingestor.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub catalog_url: String,
    pub catalog_policy: CatalogPolicy,
    pub max_feed_bytes: usize,
    pub http_client: Option<reqwest::Client>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("podscrape/{}", env!("CARGO_PKG_VERSION")),
            catalog_url: ITUNES_LOOKUP_URL.to_string(),
            catalog_policy: CatalogPolicy::default(),
            max_feed_bytes: MAX_FEED_BYTES,
            http_client: None,
        }
    }
}

impl IngestOptions {
    /// Builds the shared HTTP client, or returns the injected one.
    pub fn http_client(&self) -> Result<reqwest::Client, IngestError> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| IngestError::fetch("", "BuildClient", Some(anyhow::Error::new(e))))
    }
}

/// Builder for constructing Ingestor instances with custom configuration.
#[derive(Clone, Default)]
pub struct IngestorBuilder {
    opts: IngestOptions,
    fetcher: Option<Arc<dyn FeedFetcher>>,
    catalog: Option<Arc<dyn CatalogLookup>>,
}

impl IngestorBuilder {
    /// Create a new IngestorBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout applied to every outbound request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the catalog lookup endpoint.
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.opts.catalog_url = url.into();
        self
    }

    pub fn catalog_policy(mut self, policy: CatalogPolicy) -> Self {
        self.opts.catalog_policy = policy;
        self
    }

    /// Cap on the feed body size.
    pub fn max_feed_bytes(mut self, max: usize) -> Self {
        self.opts.max_feed_bytes = max;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Replace the HTTP feed fetcher.
    pub fn fetcher(mut self, fetcher: Arc<dyn FeedFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Replace the iTunes catalog lookup.
    pub fn catalog(mut self, catalog: Arc<dyn CatalogLookup>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.opts
    }

    /// Build the Ingestor on top of the given store.
    pub fn build(self, store: Arc<dyn ShowStore>) -> Result<Ingestor, IngestError> {
        let http = self.opts.http_client()?;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFeedFetcher::new(http.clone(), self.opts.max_feed_bytes)),
        };
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(ItunesLookup::new(http, self.opts.catalog_url.clone())),
        };
        let resolver = Resolver::new(catalog, self.opts.catalog_policy);
        Ok(Ingestor::new(resolver, fetcher, store))
    }
}
