// ABOUTME: Classifies user-supplied URLs as direct feeds or Apple Podcasts catalog pages.
// ABOUTME: Defines ResolvedSource, the feed URL plus catalog provenance handed to the normalizer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Host that marks a URL as a catalog page rather than a feed.
pub const CATALOG_HOST: &str = "podcasts.apple.com";

/// `kind` recorded on a show when the catalog did not supply one.
pub const DEFAULT_KIND: &str = "podcast";

/// Track number used for items without `<itunes:episode>` when nothing better is known.
pub const DEFAULT_TRACK_NUMBER: u64 = 1;

static CATALOG_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/id(\d+)(?:\?i=(\d+))?").unwrap());

/// Identifiers extracted from a catalog page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogRef {
    pub podcast_id: u64,
    /// The `?i=` episode id, when the URL points at a single episode.
    pub episode_id: Option<u64>,
}

/// What a user-supplied URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceUrl {
    /// Anything that is not a catalog page; used as a feed URL verbatim.
    Feed,
    Catalog(CatalogRef),
    /// A catalog page whose numeric id could not be extracted.
    MalformedCatalog,
}

/// Returns true if the URL belongs to the catalog site.
pub fn is_catalog_url(url: &str) -> bool {
    url.contains(CATALOG_HOST)
}

/// Extracts the podcast id (and optional episode id) from a catalog page URL.
pub fn extract_catalog_ref(url: &str) -> Option<CatalogRef> {
    let caps = CATALOG_ID.captures(url)?;
    let podcast_id = caps.get(1)?.as_str().parse().ok()?;
    let episode_id = caps.get(2).and_then(|m| m.as_str().parse().ok());
    Some(CatalogRef {
        podcast_id,
        episode_id,
    })
}

pub fn classify_url(url: &str) -> SourceUrl {
    if !is_catalog_url(url) {
        return SourceUrl::Feed;
    }
    match extract_catalog_ref(url) {
        Some(r) => SourceUrl::Catalog(r),
        None => SourceUrl::MalformedCatalog,
    }
}

/// A catalog lookup hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub feed_url: String,
    pub collection_id: Option<u64>,
    pub kind: Option<String>,
    pub track_count: Option<u64>,
}

/// The feed to fetch plus the provenance the normalizer stamps on the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSource {
    pub feed_url: String,
    pub catalog_id: Option<u64>,
    pub kind: Option<String>,
    pub default_track_number: Option<u64>,
}

impl ResolvedSource {
    /// A URL used as a feed URL as-is.
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            feed_url: url.into(),
            catalog_id: None,
            kind: None,
            default_track_number: Some(DEFAULT_TRACK_NUMBER),
        }
    }

    /// Adopts the feed URL and metadata from a catalog hit. Zero or empty values count as absent.
    pub fn from_catalog(entry: CatalogEntry) -> Self {
        Self {
            feed_url: entry.feed_url,
            catalog_id: entry.collection_id.filter(|id| *id != 0),
            kind: entry.kind.filter(|k| !k.is_empty()),
            default_track_number: entry.track_count.filter(|n| *n != 0),
        }
    }

    /// The kind to record on the show.
    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_KIND)
    }
}
