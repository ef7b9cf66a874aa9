// ABOUTME: Router tests for the podscrape API using tower oneshot requests.
// ABOUTME: Feed and download upstreams are served by httpmock.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use podscrape_ingest::{Ingestor, MemoryStore};
use podscrape_server::{app, AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:podcast="https://podcastindex.org/namespace/1.0">
  <channel>
    <title>Rust in Production</title>
    <description>Teams shipping Rust</description>
    <itunes:author>Ferris</itunes:author>
    <image><url>https://img.example.com/show.png</url></image>
    <itunes:image href="https://img.example.com/art.png"/>
    <podcast:guid>rip-guid</podcast:guid>
    <itunes:category text="Technology"><itunes:category text="Software"/></itunes:category>
    <item>
      <title>Compilers at Scale</title>
      <description>With guest Grace Hopper</description>
      <guid>rip-1</guid>
      <enclosure url="https://cdn.example.com/rip-1.mp3" type="audio/mpeg" length="1234"/>
      <itunes:duration>45:00</itunes:duration>
      <itunes:episode>1</itunes:episode>
    </item>
    <item>
      <title>Embedded Rust</title>
      <description>A solo episode</description>
      <guid>rip-2</guid>
      <enclosure url="https://cdn.example.com/rip-2.mp3" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

fn test_app() -> Router {
    let ingestor = Ingestor::builder()
        .build(Arc::new(MemoryStore::new()))
        .unwrap();
    app(AppState::new(ingestor, reqwest::Client::new()))
}

async fn body_json(resp: axum::response::Response) -> Value {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn scrape(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/scrape-podcast")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap()
}

async fn ingested_app(server: &MockServer) -> Router {
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(FEED);
    });
    let app = test_app();
    let resp = app
        .clone()
        .oneshot(scrape(&server.url("/feed.xml")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    app
}

#[tokio::test]
async fn scrape_returns_show_with_episodes() {
    let server = MockServer::start();
    let feed_url = server.url("/feed.xml");
    let app = ingested_app(&server).await;

    // Second scrape is served from the store.
    let resp = app.oneshot(scrape(&feed_url)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let show = body_json(resp).await;

    assert_eq!(show["feedUrl"], feed_url.as_str());
    assert_eq!(show["title"], "Rust in Production");
    assert_eq!(
        show["itunesCategories"],
        json!({ "0": "Technology", "1": "Software" })
    );
    assert_eq!(show["episodes"].as_array().unwrap().len(), 2);
    assert_eq!(show["episodes"][0]["duration"], 2700);
    assert_eq!(show["episodes"][1]["episode"], 1);
}

#[tokio::test]
async fn scrape_failure_is_500_with_error_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/broken.xml");
        then.status(200).body("<rss><channel><title>x</title></channel></rss>");
    });

    let resp = test_app()
        .oneshot(scrape(&server.url("/broken.xml")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("missing required field: rss/channel/description"));
}

#[tokio::test]
async fn malformed_scrape_body_is_400_with_error_body() {
    let bodies = [
        ("application/json", "{}".to_string()),
        ("application/json", "not json".to_string()),
        ("text/plain", json!({ "url": "https://a/rss" }).to_string()),
    ];
    for (content_type, body) in bodies {
        let req = Request::builder()
            .method("POST")
            .uri("/api/scrape-podcast")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn title_search_finds_ingested_show() {
    let server = MockServer::start();
    let app = ingested_app(&server).await;

    let resp = app
        .clone()
        .oneshot(get("/api/search/title?term=production"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let shows = body_json(resp).await;
    assert_eq!(shows.as_array().unwrap().len(), 1);
    assert_eq!(shows[0]["podcastGuid"], "rip-guid");

    let resp = app.oneshot(get("/api/search/title?term=gardening")).await.unwrap();
    assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn person_search_returns_unwound_rows() {
    let server = MockServer::start();
    let app = ingested_app(&server).await;

    let resp = app
        .clone()
        .oneshot(get("/api/search/person?person=grace%20hopper"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rows = body_json(resp).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["title"], "Rust in Production");
    assert_eq!(rows[0]["episodes"]["guid"], "rip-1");

    let resp = app
        .oneshot(get("/api/search/person?person=%28unclosed"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn podcast_and_episode_lookups() {
    let server = MockServer::start();
    let app = ingested_app(&server).await;

    let resp = app.clone().oneshot(get("/api/podcast/rip-guid")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["author"], "Ferris");

    let resp = app.clone().oneshot(get("/api/podcast/unknown")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({ "error": "Podcast not found" }));

    let resp = app.clone().oneshot(get("/api/episode/rip-2")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let episode = body_json(resp).await;
    assert_eq!(episode["title"], "Embedded Rust");
    assert_eq!(episode["feedImage"], "https://img.example.com/show.png");

    let resp = app.oneshot(get("/api/episode/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({ "error": "Episode not found" }));
}

#[tokio::test]
async fn download_proxies_body_with_attachment_headers() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/media/ep-1.mp3");
        then.status(200)
            .header("content-type", "audio/mpeg")
            .body("ID3-audio-bytes");
    });

    let target = format!("/api/download?url={}", encode(&server.url("/media/ep-1.mp3?token=abc")));
    let resp = test_app().oneshot(get(&target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"ep-1.mp3\""
    );
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ID3-audio-bytes");
}

#[tokio::test]
async fn download_defaults_name_and_content_type() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200).body("raw");
    });

    let target = format!("/api/download?url={}", encode(&server.url("/")));
    let resp = test_app().oneshot(get(&target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"episode.mp3\""
    );
}

#[tokio::test]
async fn download_rejects_missing_url_and_reports_upstream_errors() {
    let resp = test_app().oneshot(get("/api/download")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await, json!({ "error": "Invalid URL" }));

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/gone.mp3");
        then.status(404);
    });
    let target = format!("/api/download?url={}", encode(&server.url("/gone.mp3")));
    let resp = test_app().oneshot(get(&target)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
