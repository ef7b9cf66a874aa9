// ABOUTME: Integration tests for the podscrape CLI binary.
// ABOUTME: Covers file input, overrides, catalog URL resolution, and the multi-target envelope.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>CLI Show</title>
    <description>Show for CLI tests</description>
    <image><url>https://img.example.com/show.png</url></image>
    <itunes:image href="https://img.example.com/art.png"/>
    <item>
      <title>Pilot</title>
      <guid>pilot-1</guid>
      <enclosure url="https://cdn.example.com/pilot.mp3" type="audio/mpeg" length="1000"/>
      <itunes:duration>1:02:03</itunes:duration>
    </item>
  </channel>
</rss>"#;

fn podscrape_cmd() -> Command {
    Command::cargo_bin("podscrape").unwrap()
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn normalizes_feed_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.xml");
    fs::write(&path, FEED).unwrap();

    let json = stdout_json(
        podscrape_cmd()
            .arg(&path)
            .arg("--feed-url")
            .arg("https://feeds.example.com/cli.xml")
            .arg("--catalog-id")
            .arg("77")
            .arg("--compact"),
    );

    assert_eq!(json["title"], "CLI Show");
    assert_eq!(json["feedUrl"], "https://feeds.example.com/cli.xml");
    assert_eq!(json["itunesId"], 77);
    assert_eq!(json["kind"], "podcast");
    assert_eq!(json["episodes"][0]["duration"], 3723);
    assert_eq!(json["episodes"][0]["episode"], 1);
    assert_eq!(json["episodes"][0]["feedItunesId"], 77);
}

#[test]
fn default_track_and_kind_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.xml");
    fs::write(&path, FEED).unwrap();

    let json = stdout_json(
        podscrape_cmd()
            .arg(&path)
            .arg("--kind")
            .arg("audiobook")
            .arg("--default-track")
            .arg("9"),
    );

    assert_eq!(json["kind"], "audiobook");
    assert_eq!(json["episodes"][0]["episode"], 9);
}

#[test]
fn resolves_catalog_url_before_fetching() {
    let server = MockServer::start();
    let feed_url = server.url("/feed.xml");

    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/lookup")
            .query_param("id", "1200361736");
        then.status(200).body(format!(
            r#"{{"resultCount":1,"results":[{{"feedUrl":"{}","collectionId":1200361736,"kind":"podcast","trackCount":3}}]}}"#,
            feed_url
        ));
    });
    let feed = server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(FEED);
    });

    let json = stdout_json(
        podscrape_cmd()
            .arg("https://podcasts.apple.com/us/podcast/cli-show/id1200361736")
            .arg("--catalog-url")
            .arg(server.url("/lookup")),
    );

    lookup.assert();
    feed.assert();
    assert_eq!(json["feedUrl"], feed_url.as_str());
    assert_eq!(json["itunesId"], 1200361736);
    assert_eq!(json["episodes"][0]["episode"], 3);
}

#[test]
fn multiple_targets_produce_envelope() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.xml");
    fs::write(&good, FEED).unwrap();
    let missing = dir.path().join("missing.xml");

    let json = stdout_json(podscrape_cmd().arg(&good).arg(&missing));

    assert_eq!(json["total_feeds"], 2);
    assert_eq!(json["parsed"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["feeds"][0]["ok"], true);
    assert_eq!(json["feeds"][1]["ok"], false);
    assert!(json["feeds"][1]["error"]
        .as_str()
        .unwrap()
        .contains("file not found"));
}

#[test]
fn invalid_feed_reports_missing_field() {
    assert_cmd::Command::cargo_bin("podscrape")
        .unwrap()
        .arg("-")
        .write_stdin("<rss><channel><title>Only title</title></channel></rss>")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing required field: rss/channel/description"));
}

#[test]
fn feed_url_override_rejected_for_many_targets() {
    podscrape_cmd()
        .arg("a.xml")
        .arg("b.xml")
        .arg("--feed-url")
        .arg("https://x/rss")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--feed-url is only valid"));
}
