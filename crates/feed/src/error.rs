// ABOUTME: Error types for feed parsing and normalization.
// ABOUTME: Provides FeedError with Parse, Invalid, Missing, and Empty variants.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while turning feed bytes into Show and Episode records.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The bytes are not well-formed XML.
    #[error("failed to parse feed: {0}")]
    Parse(String),

    /// The XML is well-formed but is not an `<rss><channel>` document.
    #[error("invalid feed: {0}")]
    Invalid(String),

    /// A field the records cannot be built without is absent.
    #[error("missing required field: {path}")]
    Missing { path: String },

    /// The channel contains no items.
    #[error("feed is empty: no items found")]
    Empty,
}

impl FeedError {
    /// Creates a Parse error from an underlying XML error.
    pub fn parse(err: impl fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }

    /// Creates an Invalid error with a custom message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        FeedError::Invalid(msg.into())
    }

    /// Creates a Missing error naming the document path, e.g. `rss/channel/image/url`.
    pub fn missing(path: impl Into<String>) -> Self {
        FeedError::Missing { path: path.into() }
    }

    /// Returns the missing document path if this is a Missing error.
    pub fn missing_path(&self) -> Option<&str> {
        match self {
            FeedError::Missing { path } => Some(path),
            _ => None,
        }
    }
}
