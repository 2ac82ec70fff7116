//! HTTP transport abstraction and structured fetch errors.
//!
//! The [`HttpTransport`] trait abstracts the two requests the fetcher makes —
//! a metadata probe (HEAD) and a streaming body download (GET) — so the fetch
//! pipeline can be exercised against a mock in tests.

use chrono::NaiveDateTime;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

use crate::dates::DateGranularity;

/// Structured error types for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not a valid trading session: {0}")]
    InvalidDate(DateGranularity),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("unexpected content type '{content_type}' for {url}")]
    UnexpectedContentType { url: String, content_type: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote metadata from a HEAD probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMeta {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// Last-Modified parsed from its RFC 1123 form, as a naive UTC timestamp.
    pub modified: Option<NaiveDateTime>,
}

/// The two requests the fetch pipeline needs.
pub trait HttpTransport {
    /// Metadata-only request; returns whatever the remote said, including
    /// non-success statuses. Transport-level failures are errors.
    fn probe(&self, url: &str) -> Result<ResourceMeta, FetchError>;

    /// Streaming body request. The returned reader yields the body
    /// incrementally; callers choose the chunk size.
    fn get(&self, url: &str) -> Result<Box<dyn Read>, FetchError>;
}

/// Blocking reqwest-backed transport. One instance holds one connection
/// pool, reused across every request of a batch.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn probe(&self, url: &str) -> Result<ResourceMeta, FetchError> {
        let resp = self.client.head(url).send()?;

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(ResourceMeta {
            status: resp.status().as_u16(),
            content_type: header("content-type"),
            content_length: header("content-length").and_then(|v| v.parse().ok()),
            modified: header("last-modified").as_deref().and_then(parse_http_date),
        })
    }

    fn get(&self, url: &str) -> Result<Box<dyn Read>, FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Box::new(resp))
    }
}

/// Parses an RFC 1123 date (`Tue, 06 Apr 2021 18:32:55 GMT`) to naive UTC.
fn parse_http_date(s: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.naive_utc())
}
