// ABOUTME: CLI for normalizing podcast feeds with the podscrape feed core.
// ABOUTME: Resolves catalog URLs, fetches feeds from URL or file/stdin, and prints the Show as JSON.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use podscrape_feed::{parse_feed_bytes, ResolvedSource, Show};
use podscrape_ingest::{
    CatalogPolicy, FeedFetcher, HttpFeedFetcher, IngestOptions, ItunesLookup, Resolver,
    ITUNES_LOOKUP_URL,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Normalize one or more podcast RSS feeds and output JSON.
#[derive(Parser, Debug)]
#[command(name = "podscrape")]
#[command(about = "Normalize podcast feeds and print the show as JSON", long_about = None)]
struct Args {
    /// Feed or Apple Podcasts URL(s), or local file paths. Use "-" to read one feed from stdin.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Override the feedUrl value (only valid when a single target is provided).
    #[arg(long)]
    feed_url: Option<String>,

    /// Provenance kind recorded on the show (default "podcast").
    #[arg(long)]
    kind: Option<String>,

    /// Catalog id recorded on the show and its episodes.
    #[arg(long)]
    catalog_id: Option<u64>,

    /// Episode number used when an item has none.
    #[arg(long)]
    default_track: Option<u64>,

    /// Catalog lookup endpoint.
    #[arg(long, env = "PODSCRAPE_CATALOG_URL", default_value = ITUNES_LOOKUP_URL)]
    catalog_url: String,

    /// Timeout for each outbound request, in seconds.
    #[arg(long, env = "PODSCRAPE_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

struct Sources {
    resolver: Resolver,
    fetcher: HttpFeedFetcher,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.targets.len() > 1 && args.feed_url.is_some() {
        bail!("--feed-url is only valid when parsing a single target");
    }

    let opts = IngestOptions {
        timeout: Duration::from_secs(args.timeout_secs),
        catalog_url: args.catalog_url.clone(),
        ..IngestOptions::default()
    };
    let http = opts.http_client()?;
    let sources = Sources {
        resolver: Resolver::new(
            Arc::new(ItunesLookup::new(http.clone(), opts.catalog_url.clone())),
            CatalogPolicy::FallBackToUrl,
        ),
        fetcher: HttpFeedFetcher::new(http, opts.max_feed_bytes),
    };

    let mut results = Vec::new();
    for target in &args.targets {
        match normalize_target(&sources, &args, target).await {
            Ok(show) => results.push(json!({
                "feed_url": show.feed_url,
                "ok": true,
                "feed": show,
                "error": null
            })),
            Err(err) => results.push(json!({
                "feed_url": args.feed_url.clone().unwrap_or_else(|| target.clone()),
                "ok": false,
                "feed": null,
                "error": format!("{:#}", err)
            })),
        }
    }

    let parsed = results
        .iter()
        .filter(|r| r.get("ok").and_then(|v| v.as_bool()) == Some(true))
        .count();

    // A single successful target prints the show itself.
    let output = if results.len() == 1 && parsed == 1 {
        results[0].get("feed").cloned().unwrap_or_else(|| json!({}))
    } else {
        json!({
            "feeds": results,
            "total_feeds": results.len(),
            "parsed": parsed,
            "failed": results.len() - parsed
        })
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

async fn normalize_target(sources: &Sources, args: &Args, target: &str) -> Result<Show> {
    let (bytes, mut source) = if is_url(target) {
        let source = sources.resolver.resolve(target).await?;
        let bytes = sources.fetcher.fetch(&source.feed_url).await?;
        (bytes.to_vec(), source)
    } else {
        (load_local(target)?, ResolvedSource::direct(target))
    };

    if let Some(feed_url) = &args.feed_url {
        source.feed_url = feed_url.clone();
    }
    if args.kind.is_some() {
        source.kind = args.kind.clone();
    }
    if args.catalog_id.is_some() {
        source.catalog_id = args.catalog_id;
    }
    if args.default_track.is_some() {
        source.default_track_number = args.default_track;
    }

    let feed = parse_feed_bytes(&bytes, &source)?;
    Ok(feed.into_show())
}

fn is_url(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn load_local(target: &str) -> Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    Ok(fs::read(path)?)
}
