//! Error taxonomy for the crawler.
//!
//! Fetch and parse failures are never retried. They travel up the search
//! stream and abort the whole aggregation run.

use thiserror::Error;

/// Boxed transport error carried by [`CrawlError::Fetch`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CrawlError {
    /// The request never produced a response (DNS, TLS, timeout, reset...).
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Fetched content lacks the structure the site parser expects.
    #[error("unexpected page structure: {context}")]
    Parse { context: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CrawlError {
    pub fn parse(context: impl Into<String>) -> Self {
        CrawlError::Parse {
            context: context.into(),
        }
    }

    /// True for the transport-level failures (`Fetch` and `HttpStatus`).
    pub fn is_fetch(&self) -> bool {
        matches!(self, CrawlError::Fetch { .. } | CrawlError::HttpStatus { .. })
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
