// ABOUTME: Axum router for the podscrape API: ingestion, search, lookups, and the download proxy.
// ABOUTME: Handlers are thin; ingestion and storage live in podscrape-ingest.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use podscrape_feed::{Episode, Show};
use podscrape_ingest::{validate_http_url, EpisodeHit, Ingestor, ShowStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;

/// Maximum rows returned by the search routes.
pub const SEARCH_LIMIT: usize = 20;

const DEFAULT_DOWNLOAD_NAME: &str = "episode.mp3";

pub struct AppState {
    pub ingestor: Ingestor,
    pub store: Arc<dyn ShowStore>,
    /// Client used by the download proxy.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(ingestor: Ingestor, http: reqwest::Client) -> Self {
        let store = ingestor.store().clone();
        Self {
            ingestor,
            store,
            http,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/scrape-podcast", post(scrape_podcast_handler))
        .route("/api/search/title", get(search_title_handler))
        .route("/api/search/person", get(search_person_handler))
        .route("/api/podcast/{guid}", get(podcast_handler))
        .route("/api/episode/{id}", get(episode_handler))
        .route("/api/download", get(download_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TitleQuery {
    #[serde(default)]
    term: String,
}

#[derive(Debug, Deserialize)]
struct PersonQuery {
    #[serde(default)]
    person: String,
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    url: Option<String>,
}

async fn scrape_podcast_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<Show>, ApiError> {
    let Json(req) = payload?;
    let show = state.ingestor.ingest(&req.url).await?;
    Ok(Json(show))
}

async fn search_title_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Show>>, ApiError> {
    let shows = state.store.search_title(&query.term, SEARCH_LIMIT).await?;
    Ok(Json(shows))
}

async fn search_person_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PersonQuery>,
) -> Result<Json<Vec<EpisodeHit>>, ApiError> {
    let hits = state
        .store
        .search_episodes_by_description(&query.person, SEARCH_LIMIT)
        .await?;
    Ok(Json(hits))
}

async fn podcast_handler(
    State(state): State<Arc<AppState>>,
    Path(guid): Path<String>,
) -> Result<Json<Show>, ApiError> {
    state
        .store
        .find_by_podcast_guid(&guid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Podcast not found"))
}

async fn episode_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Episode>, ApiError> {
    state
        .store
        .find_episode_by_guid(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Episode not found"))
}

/// Streams a remote enclosure back to the caller as an attachment.
async fn download_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    const OP: &str = "Download";
    let raw = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Invalid URL".to_string()))?;
    let url = validate_http_url(&raw, OP)
        .map_err(|_| ApiError::BadRequest("Invalid URL".to_string()))?;

    let upstream = state
        .http
        .get(url.clone())
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(ApiError::internal)?;

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download_filename(&url)
    ))
    .map_err(ApiError::internal)?;

    info!(url = %url, "proxying download");
    let body = Body::from_stream(upstream.bytes_stream());
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Last path segment of the URL, form-urlencoded, or `episode.mp3` when there is none.
pub fn download_filename(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| url::form_urlencoded::byte_serialize(segment.as_bytes()).collect())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}
