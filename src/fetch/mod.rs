// src/fetch/mod.rs
// =============================================================================
// The transport seam of the pipeline.
//
// Every level of the crawl talks to the site through the Fetcher trait, so
// the pipeline never sees reqwest directly. In production that is
// HttpFetcher; in tests it is a scripted stub that counts calls.
//
// A Fetcher reports the status it got. Deciding whether a 404 or a 503 is
// terminal or transient is the pipeline's job, not the transport's.
// =============================================================================

mod http;

pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;

/// Status and full body of one GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turns a non-2xx response into `FetchError::Status`
    pub fn require_success(self, url: &str) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
