// src/error.rs
// =============================================================================
// Error types for the harvest pipeline.
//
// Three layers:
// - FetchError: something went wrong talking to the site (transport or status)
// - ExtractError: a fetched document did not have the structure we expect
// - CrawlError: everything the pipeline can fail with, with the URL or path
//   that was being processed attached
//
// The retry executor decides what to do with a CrawlError through the
// Classify trait (see pipeline/retry.rs), so the variants here are the
// single source of truth for "transient vs terminal vs fatal".
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// A failed request, as seen by the pipeline.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection-level failure: DNS, refused, reset, timeout, TLS
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered, but not with a 2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// The HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }
}

/// An expected element or attribute is missing from a fetched document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no element matches `{selector}`")]
    MissingElement { selector: &'static str },

    #[error("`{selector}` has no `{attribute}` attribute")]
    MissingAttribute {
        selector: &'static str,
        attribute: &'static str,
    },

    #[error("option value `{value}` has no `?file=` parameter")]
    MissingFileParameter { value: String },

    #[error("pagination text `{text}` is not a page number")]
    InvalidPageCount { text: String },
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A successfully fetched listing or item document is missing structure
    #[error("unexpected document structure at {url}: {source}")]
    Structure {
        url: String,
        #[source]
        source: ExtractError,
    },

    /// The listing root did not report a usable page count
    #[error("cannot determine page count from {url}: {source}")]
    PageCount {
        url: String,
        #[source]
        source: ExtractError,
    },

    #[error("malformed URL `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} gate is closed")]
    GateClosed(&'static str),
}

impl CrawlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrawlError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl Into<String>) -> Self {
        CrawlError::MalformedUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
