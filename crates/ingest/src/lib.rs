// ABOUTME: Ingestion pipeline for podscrape: catalog resolution, feed fetching, and show storage.
// ABOUTME: Ingestor ties a Resolver, a FeedFetcher, and a ShowStore into one read-through call.

pub mod catalog;
pub mod error;
pub mod fetch;
pub mod ingestor;
pub mod options;
pub mod resolver;
pub mod store;

pub use catalog::{CatalogLookup, ItunesLookup, ITUNES_LOOKUP_URL};
pub use error::{ErrorCode, IngestError};
pub use fetch::{validate_http_url, FeedFetcher, HttpFeedFetcher, MAX_FEED_BYTES};
pub use ingestor::Ingestor;
pub use options::{CatalogPolicy, IngestOptions, IngestorBuilder};
pub use resolver::Resolver;
pub use store::{EpisodeHit, JsonFileStore, MemoryStore, ShowStore};
