// ABOUTME: Server configuration from command-line flags with PODSCRAPE_* environment fallbacks.
// ABOUTME: Builds the show store, the ingestor, and the download client from the parsed settings.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use podscrape_ingest::{
    CatalogPolicy, Ingestor, IngestorBuilder, JsonFileStore, MemoryStore, ShowStore,
    ITUNES_LOOKUP_URL,
};

/// HTTP API for ingesting and searching podcast feeds.
#[derive(Parser, Debug, Clone)]
#[command(name = "podscrape-server")]
#[command(about = "Serve the podscrape ingestion and search API", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "PODSCRAPE_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// JSON file for persisted shows. Without it shows live in memory only.
    #[arg(long, env = "PODSCRAPE_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Timeout for feed fetches and catalog lookups, in seconds.
    #[arg(long, env = "PODSCRAPE_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Catalog lookup endpoint.
    #[arg(long, env = "PODSCRAPE_CATALOG_URL", default_value = ITUNES_LOOKUP_URL)]
    pub catalog_url: String,

    #[arg(long, env = "PODSCRAPE_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Fail ingestion when a catalog URL cannot be resolved instead of using it as a feed URL.
    #[arg(long, env = "PODSCRAPE_STRICT_CATALOG", default_value_t = false)]
    pub strict_catalog: bool,
}

impl ServerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn catalog_policy(&self) -> CatalogPolicy {
        if self.strict_catalog {
            CatalogPolicy::Fail
        } else {
            CatalogPolicy::FallBackToUrl
        }
    }

    pub async fn open_store(&self) -> anyhow::Result<Arc<dyn ShowStore>> {
        Ok(match &self.data_file {
            Some(path) => Arc::new(
                JsonFileStore::open(path)
                    .await
                    .with_context(|| format!("open data file {}", path.display()))?,
            ),
            None => Arc::new(MemoryStore::new()),
        })
    }

    pub fn ingestor_builder(&self) -> IngestorBuilder {
        let mut builder = Ingestor::builder()
            .timeout(self.fetch_timeout())
            .catalog_url(self.catalog_url.clone())
            .catalog_policy(self.catalog_policy());
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder
    }

    /// Client for the download proxy. Bodies can be long audio files, so only
    /// connecting is bounded by the fetch timeout.
    pub fn download_client(&self) -> anyhow::Result<reqwest::Client> {
        let builder = self.ingestor_builder();
        reqwest::Client::builder()
            .user_agent(builder.options().user_agent.clone())
            .connect_timeout(self.fetch_timeout())
            .build()
            .context("build download client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["podscrape-server"]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.catalog_url, ITUNES_LOOKUP_URL);
        assert_eq!(config.catalog_policy(), CatalogPolicy::FallBackToUrl);
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "podscrape-server",
            "--bind",
            "0.0.0.0:8080",
            "--fetch-timeout-secs",
            "5",
            "--strict-catalog",
            "--user-agent",
            "test-agent/1.0",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.catalog_policy(), CatalogPolicy::Fail);
        assert_eq!(
            config.ingestor_builder().options().user_agent,
            "test-agent/1.0"
        );
    }
}
