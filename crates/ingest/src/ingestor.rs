// ABOUTME: Read-through ingestion: resolve the user URL, reuse a stored show, or fetch and normalize.
// ABOUTME: A feed URL is stored at most once; repeated ingests return the stored document.

use std::sync::Arc;

use podscrape_feed::{parse_feed_bytes, Show};
use tracing::info;

use crate::error::IngestError;
use crate::fetch::FeedFetcher;
use crate::options::IngestorBuilder;
use crate::resolver::Resolver;
use crate::store::ShowStore;

#[derive(Clone)]
pub struct Ingestor {
    resolver: Resolver,
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn ShowStore>,
}

impl Ingestor {
    pub fn new(resolver: Resolver, fetcher: Arc<dyn FeedFetcher>, store: Arc<dyn ShowStore>) -> Self {
        Self {
            resolver,
            fetcher,
            store,
        }
    }

    pub fn builder() -> IngestorBuilder {
        IngestorBuilder::new()
    }

    pub fn store(&self) -> &Arc<dyn ShowStore> {
        &self.store
    }

    /// Ingests the show behind `user_url`.
    ///
    /// If a show with the resolved feed URL is already stored it is returned
    /// without fetching. Otherwise the feed is fetched, normalized, and stored.
    pub async fn ingest(&self, user_url: &str) -> Result<Show, IngestError> {
        let source = self.resolver.resolve(user_url).await?;

        if let Some(existing) = self.store.find_by_feed_url(&source.feed_url).await? {
            info!(feed_url = %source.feed_url, "podcast already exists");
            return Ok(existing);
        }

        let body = self.fetcher.fetch(&source.feed_url).await?;
        let feed = parse_feed_bytes(&body, &source)
            .map_err(|e| IngestError::feed(source.feed_url.clone(), e))?;
        let show = feed.into_show();

        info!(
            feed_url = %show.feed_url,
            title = %show.title,
            episodes = show.episode_count,
            "ingested podcast"
        );
        self.store.insert_if_absent(show).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogLookup;
    use crate::options::CatalogPolicy;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use bytes::Bytes;
    use podscrape_feed::CatalogEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FEED: &str = r#"<?xml version="1.0"?>
<rss xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" version="2.0">
  <channel>
    <title>Stored Show</title>
    <description>Desc</description>
    <image><url>https://img/show.png</url></image>
    <itunes:image href="https://img/show-art.png"/>
    <item>
      <title>One</title>
      <guid>ep-1</guid>
      <enclosure url="https://cdn/1.mp3" type="audio/mpeg" length="100"/>
      <itunes:duration>01:00</itunes:duration>
    </item>
  </channel>
</rss>"#;

    struct CountingFetcher {
        body: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes, IngestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(self.body.as_bytes()))
        }
    }

    struct NoCatalog;

    #[async_trait]
    impl CatalogLookup for NoCatalog {
        async fn lookup(&self, _podcast_id: u64) -> Result<Option<CatalogEntry>, IngestError> {
            Ok(None)
        }
    }

    fn ingestor(body: &'static str) -> (Ingestor, Arc<CountingFetcher>) {
        let fetcher = Arc::new(CountingFetcher {
            body,
            calls: AtomicUsize::new(0),
        });
        let ingestor = Ingestor::new(
            Resolver::new(Arc::new(NoCatalog), CatalogPolicy::FallBackToUrl),
            fetcher.clone(),
            Arc::new(MemoryStore::new()),
        );
        (ingestor, fetcher)
    }

    #[tokio::test]
    async fn test_second_ingest_reuses_stored_show() {
        let (ingestor, fetcher) = ingestor(FEED);

        let first = ingestor.ingest("https://feeds.example.com/rss").await.unwrap();
        let second = ingestor.ingest("https://feeds.example.com/rss").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.episodes[0].duration, 60);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_feed_is_not_stored() {
        let (ingestor, _) = ingestor("<rss><channel></channel></rss>");

        let err = ingestor.ingest("https://feeds.example.com/rss").await.unwrap_err();
        assert!(err.is_feed());
        assert!(ingestor
            .store()
            .find_by_feed_url("https://feeds.example.com/rss")
            .await
            .unwrap()
            .is_none());
    }
}
