// ABOUTME: HTTP front end for podscrape built on axum.
// ABOUTME: Exposes the router, its shared state, configuration, and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{app, download_filename, AppState, SEARCH_LIMIT};
