// ABOUTME: Normalized Show, Episode, and PersonCredit records produced from a feed.
// ABOUTME: Field names serialize in camelCase, matching the stored document shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flattened category labels keyed by zero-based position.
///
/// Keys serialize as decimal strings (`{"0": "Technology", "1": "Gadgets"}`).
pub type Categories = BTreeMap<usize, String>;

/// A contributor credit attached to a show or an episode.
///
/// `id` is the 1-based position inside the containing list. It is recomputed on
/// every normalization and is not a stable identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCredit {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub group: String,
    pub href: String,
    pub img: String,
}

/// One `<item>` of a feed, owned by exactly one [`Show`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub pub_date: Option<DateTime<Utc>>,
    /// Length in seconds.
    pub duration: u64,
    pub enclosure_length: Option<u64>,
    pub enclosure_type: Option<String>,
    pub enclosure_url: String,
    pub episode: Option<u64>,
    pub episode_type: String,
    /// 1 when the item is flagged explicit, 0 otherwise.
    pub explicit: u8,
    pub guid: Option<String>,
    pub link: Option<String>,
    pub image: String,
    // Copied from the show at normalization time, never re-synced.
    pub feed_image: String,
    #[serde(rename = "feedItunesId")]
    pub feed_catalog_id: Option<u64>,
    pub feed_language: Option<String>,
    pub chapters_url: Option<String>,
    pub transcript_url: Option<String>,
    #[serde(default)]
    pub transcript_urls: Vec<String>,
    #[serde(default)]
    pub persons: Vec<PersonCredit>,
}

/// A podcast, keyed by `feed_url`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub feed_url: String,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    #[serde(rename = "itunesId")]
    pub catalog_id: Option<u64>,
    pub itunes_type: Option<String>,
    pub language: Option<String>,
    pub link: Option<String>,
    pub image: String,
    pub artwork: String,
    pub last_build_date: Option<DateTime<Utc>>,
    #[serde(rename = "itunesCategories", default)]
    pub categories: Categories,
    pub generator: Option<String>,
    pub copyright: Option<String>,
    pub podcast_guid: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub explicit: bool,
    /// Number of items present when the feed was parsed.
    pub episode_count: usize,
    pub kind: String,
    #[serde(rename = "itunesSummary")]
    pub summary: Option<String>,
    #[serde(rename = "itunesSubtitle")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub persons: Vec<PersonCredit>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Show {
    /// Finds an embedded episode by guid.
    pub fn episode_by_guid(&self, guid: &str) -> Option<&Episode> {
        self.episodes
            .iter()
            .find(|ep| ep.guid.as_deref() == Some(guid))
    }
}

/// Output of the feed normalizer: the show and its episodes, not yet joined.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFeed {
    pub show: Show,
    pub episodes: Vec<Episode>,
}

impl NormalizedFeed {
    /// Attaches the episodes to the show, producing the stored document.
    pub fn into_show(self) -> Show {
        let NormalizedFeed { mut show, episodes } = self;
        show.episodes = episodes;
        show
    }
}
