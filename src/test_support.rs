// src/test_support.rs
// =============================================================================
// Shared helpers for pipeline tests: a scripted Fetcher that counts calls
// per URL, and HTML fixtures shaped like the real listing site.
// =============================================================================

use crate::error::FetchError;
use crate::fetch::{FetchResponse, Fetcher};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Reply = Result<FetchResponse, FetchError>;

#[derive(Default)]
struct Route {
    // consumed first, one per call
    queued: VecDeque<Reply>,
    // returned once the queue is empty
    then: Option<Reply>,
}

/// Unknown URLs answer 404
#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        routes.entry(url.to_string()).or_default().then =
            Some(Ok(FetchResponse::new(status, body)));
        self
    }

    /// The next `times` calls to `url` fail at the transport level
    pub fn fail_transport(&self, url: &str, times: usize) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        let route = routes.entry(url.to_string()).or_default();
        for _ in 0..times {
            route.queued.push_back(Err(FetchError::Transport {
                url: url.to_string(),
                reason: "Connection failed".to_string(),
            }));
        }
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(route) => match route.queued.pop_front() {
                Some(reply) => reply,
                None => route
                    .then
                    .clone()
                    .unwrap_or_else(|| Ok(FetchResponse::new(404, "no route"))),
            },
            None => Ok(FetchResponse::new(404, "no route")),
        }
    }
}

pub fn listing_root_html(pages: &str) -> String {
    format!(
        r#"<html><body>
            <div class="nav-links">
                <span class="page-numbers current">1</span>
                <a class="page-numbers" href="/page/2">2</a>
                <a class="page-numbers" href="/page/{pages}">{pages}</a>
                <a class="next page-numbers" href="/page/2">Next</a>
            </div>
        </body></html>"#
    )
}

/// `(item_url, hidden)` pairs, one post each
pub fn listing_page_html(items: &[(&str, bool)]) -> String {
    let posts: String = items
        .iter()
        .map(|(url, hidden)| {
            let style = if *hidden { r#" style="display:none""# } else { "" };
            format!(
                r#"<article class="post"{style}>
                    <div class="entry-content"><a class="more-link" href="{url}">Read more</a></div>
                </article>"#
            )
        })
        .collect();
    format!("<html><body>{posts}</body></html>")
}

pub fn item_html(asset_urls: &[&str]) -> String {
    let options: String = asset_urls
        .iter()
        .map(|url| {
            format!(r#"<option value="https://example.com/viewer.html?file={url}">{url}</option>"#)
        })
        .collect();
    format!(
        r#"<html><body><select id="selector" class="vi13">{options}</select></body></html>"#
    )
}

/// An item page whose layout lost the asset selector
pub fn broken_item_html() -> String {
    "<html><body><p>This item has moved.</p></body></html>".to_string()
}
