// ABOUTME: Error types for ingestion including ErrorCode enum and IngestError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

use podscrape_feed::FeedError;

/// Categories of ingestion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    Catalog,
    Feed,
    Store,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Catalog => "catalog lookup error",
            ErrorCode::Feed => "feed error",
            ErrorCode::Store => "store error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every ingestion step.
#[derive(Debug, thiserror::Error)]
pub struct IngestError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl IngestError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Timeout, url, op, source)
    }

    /// Create a Catalog error.
    pub fn catalog(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Catalog, url, op, source)
    }

    /// Wrap a normalization failure.
    pub fn feed(url: impl Into<String>, err: FeedError) -> Self {
        Self::with_code(ErrorCode::Feed, url, "Normalize", Some(anyhow::Error::new(err)))
    }

    /// Create a Store error.
    pub fn store(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Store, url, op, source)
    }

    /// Maps a reqwest failure to Timeout or Fetch.
    pub fn from_reqwest(url: impl Into<String>, op: impl Into<String>, err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::Timeout
        } else {
            ErrorCode::Fetch
        };
        Self::with_code(code, url, op, Some(anyhow::Error::new(err)))
    }

    /// Returns the underlying feed error if normalization failed.
    pub fn feed_error(&self) -> Option<&FeedError> {
        self.source.as_ref()?.downcast_ref::<FeedError>()
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Catalog error.
    pub fn is_catalog(&self) -> bool {
        self.code == ErrorCode::Catalog
    }

    /// Returns true if this is a Feed error.
    pub fn is_feed(&self) -> bool {
        self.code == ErrorCode::Feed
    }

    /// Returns true if this is a Store error.
    pub fn is_store(&self) -> bool {
        self.code == ErrorCode::Store
    }
}
