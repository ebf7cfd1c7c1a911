// src/fetch/http.rs
// =============================================================================
// The reqwest-backed Fetcher.
//
// Key functionality:
// - One shared Client (connection pooling) for every page, item and asset
// - Origin and Referer set to the site's own origin on every request; the
//   upstream site refuses asset downloads without them
// - Transport failures categorised into a short readable reason
//
// No per-request timeout by default: asset bodies can be large binaries and
// the pipeline retries anything that fails anyway.
// =============================================================================

use super::{FetchResponse, Fetcher};
use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::Client;
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Parameters:
    //   origin: value for the Origin and Referer headers ("https://site/")
    //   timeout: optional per-request timeout
    pub fn new(origin: &str, timeout: Option<Duration>) -> Result<Self> {
        let origin_value = HeaderValue::from_str(origin)
            .with_context(|| format!("invalid origin header value: {}", origin))?;

        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, origin_value.clone());
        headers.insert(REFERER, origin_value);

        let mut builder = Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status().as_u16();

        // The body is read even for error statuses; a failure while streaming
        // it is a transport failure like any other
        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_error(url, e))?;

        Ok(FetchResponse::new(status, body.to_vec()))
    }
}

// Turns a reqwest error into a FetchError::Transport with a short reason
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure / connection refused
// - SSL certificate issues
// - Too many redirects
fn categorize_error(url: &str, error: reqwest::Error) -> FetchError {
    let error_string = error.to_string();

    let reason = if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    FetchError::Transport {
        url: url.to_string(),
        reason,
    }
}
