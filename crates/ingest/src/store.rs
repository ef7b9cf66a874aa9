// ABOUTME: Show persistence keyed by feed URL, with title search and episode description search.
// ABOUTME: MemoryStore keeps documents in process; JsonFileStore snapshots them to disk after each insert.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use podscrape_feed::{Episode, Show};
use regex::RegexBuilder;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::IngestError;

/// One row of the episode search: the show with `episodes` replaced by a single match.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeHit {
    /// The owning show, without its episode list.
    pub show: Show,
    pub episode: Episode,
}

impl Serialize for EpisodeHit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut doc = serde_json::to_value(&self.show).map_err(S::Error::custom)?;
        let episode = serde_json::to_value(&self.episode).map_err(S::Error::custom)?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("episodes".to_string(), episode);
        }
        doc.serialize(serializer)
    }
}

/// Document store for shows. `feed_url` is unique.
#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn find_by_feed_url(&self, feed_url: &str) -> Result<Option<Show>, IngestError>;

    /// Stores the show unless one with the same feed URL exists; returns whichever is stored.
    async fn insert_if_absent(&self, show: Show) -> Result<Show, IngestError>;

    /// Shows whose text fields contain any word of `term`, best matches first.
    async fn search_title(&self, term: &str, limit: usize) -> Result<Vec<Show>, IngestError>;

    /// Episodes whose description matches `pattern` as a case-insensitive regex.
    async fn search_episodes_by_description(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<EpisodeHit>, IngestError>;

    async fn find_by_podcast_guid(&self, guid: &str) -> Result<Option<Show>, IngestError>;

    /// Finds an episode by guid across every show.
    async fn find_episode_by_guid(&self, guid: &str) -> Result<Option<Episode>, IngestError>;
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn text_score(show: &Show, terms: &HashSet<String>) -> usize {
    let fields = [
        Some(show.title.as_str()),
        Some(show.description.as_str()),
        show.author.as_deref(),
        show.summary.as_deref(),
        show.subtitle.as_deref(),
    ];
    let present: HashSet<String> = fields.into_iter().flatten().flat_map(words).collect();
    terms.iter().filter(|t| present.contains(*t)).count()
}

/// Process-local store. Insertion order is preserved for ranking ties and scans.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shows: RwLock<Vec<Show>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shows(shows: Vec<Show>) -> Self {
        Self {
            shows: RwLock::new(shows),
        }
    }

    pub async fn len(&self) -> usize {
        self.shows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shows.read().await.is_empty()
    }

    async fn snapshot(&self) -> Vec<Show> {
        self.shows.read().await.clone()
    }
}

#[async_trait]
impl ShowStore for MemoryStore {
    async fn find_by_feed_url(&self, feed_url: &str) -> Result<Option<Show>, IngestError> {
        let shows = self.shows.read().await;
        Ok(shows.iter().find(|s| s.feed_url == feed_url).cloned())
    }

    async fn insert_if_absent(&self, show: Show) -> Result<Show, IngestError> {
        let mut shows = self.shows.write().await;
        if let Some(existing) = shows.iter().find(|s| s.feed_url == show.feed_url) {
            return Ok(existing.clone());
        }
        shows.push(show.clone());
        Ok(show)
    }

    async fn search_title(&self, term: &str, limit: usize) -> Result<Vec<Show>, IngestError> {
        let terms: HashSet<String> = words(term).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let shows = self.shows.read().await;
        let mut scored: Vec<(usize, &Show)> = shows
            .iter()
            .map(|s| (text_score(s, &terms), s))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn search_episodes_by_description(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<EpisodeHit>, IngestError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                IngestError::store(pattern, "SearchEpisodes", Some(anyhow::Error::new(e)))
            })?;

        let shows = self.shows.read().await;
        let hits = shows
            .iter()
            .flat_map(|show| {
                show.episodes
                    .iter()
                    .filter(|ep| re.is_match(&ep.description))
                    .map(move |ep| (show, ep))
            })
            .take(limit)
            .map(|(show, ep)| EpisodeHit {
                show: Show {
                    episodes: Vec::new(),
                    ..show.clone()
                },
                episode: ep.clone(),
            })
            .collect();
        Ok(hits)
    }

    async fn find_by_podcast_guid(&self, guid: &str) -> Result<Option<Show>, IngestError> {
        let shows = self.shows.read().await;
        Ok(shows
            .iter()
            .find(|s| s.podcast_guid.as_deref() == Some(guid))
            .cloned())
    }

    async fn find_episode_by_guid(&self, guid: &str) -> Result<Option<Episode>, IngestError> {
        let shows = self.shows.read().await;
        Ok(shows
            .iter()
            .find_map(|s| s.episode_by_guid(guid))
            .cloned())
    }
}

/// A MemoryStore whose contents are written to a JSON file after every insert.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryStore,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Loads the snapshot at `path`, or starts empty if the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let path = path.into();
        let shows = if fs::try_exists(&path).await.map_err(|e| store_io(&path, "OpenStore", e))? {
            let raw = fs::read(&path)
                .await
                .map_err(|e| store_io(&path, "OpenStore", e))?;
            serde_json::from_slice::<Vec<Show>>(&raw).map_err(|e| {
                IngestError::store(path.display().to_string(), "OpenStore", Some(anyhow::Error::new(e)))
            })?
        } else {
            Vec::new()
        };
        tracing::info!(path = %path.display(), shows = shows.len(), "opened show store");

        Ok(Self {
            inner: MemoryStore::with_shows(shows),
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Writes `shows` via a temp file and an atomic rename.
    async fn persist(&self, shows: &[Show]) -> Result<(), IngestError> {
        const OP: &str = "PersistStore";
        let json = serde_json::to_vec(shows).map_err(|e| {
            IngestError::store(self.path.display().to_string(), OP, Some(anyhow::Error::new(e)))
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| store_io(&dir, OP, e))?;

        let temp_path = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| store_io(&temp_path, OP, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| store_io(&temp_path, OP, e))?;
        file.flush().await.map_err(|e| store_io(&temp_path, OP, e))?;
        drop(file);

        if let Err(err) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(store_io(&self.path, OP, err));
        }
        Ok(())
    }
}

fn store_io(path: &Path, op: &str, err: std::io::Error) -> IngestError {
    IngestError::store(path.display().to_string(), op, Some(anyhow::Error::new(err)))
}

#[async_trait]
impl ShowStore for JsonFileStore {
    async fn find_by_feed_url(&self, feed_url: &str) -> Result<Option<Show>, IngestError> {
        self.inner.find_by_feed_url(feed_url).await
    }

    async fn insert_if_absent(&self, show: Show) -> Result<Show, IngestError> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.inner.find_by_feed_url(&show.feed_url).await? {
            return Ok(existing);
        }

        // The file is written first; memory only sees the show once it is on disk.
        let mut next = self.inner.snapshot().await;
        next.push(show.clone());
        self.persist(&next).await?;
        self.inner.insert_if_absent(show).await
    }

    async fn search_title(&self, term: &str, limit: usize) -> Result<Vec<Show>, IngestError> {
        self.inner.search_title(term, limit).await
    }

    async fn search_episodes_by_description(
        &self,
        pattern: &str,
        limit: usize,
    ) -> Result<Vec<EpisodeHit>, IngestError> {
        self.inner.search_episodes_by_description(pattern, limit).await
    }

    async fn find_by_podcast_guid(&self, guid: &str) -> Result<Option<Show>, IngestError> {
        self.inner.find_by_podcast_guid(guid).await
    }

    async fn find_episode_by_guid(&self, guid: &str) -> Result<Option<Episode>, IngestError> {
        self.inner.find_episode_by_guid(guid).await
    }
}
