// src/pipeline/page.rs
// =============================================================================
// Lists one listing page and resolves every item on it.
//
// How it works:
// 1. Fetch "{listing}/page/{n}" once (this fetch is not retried)
// 2. Extract the item links, dropping posts hidden by their own style
// 3. Resolve every item concurrently and wait for all of them
//
// There is no gate at this level; item resolution is bounded by the
// ItemGate inside ItemResolver. An item that fails is recorded in the
// page report and its siblings carry on.
// =============================================================================

use super::item::ItemResolver;
use super::report::{BranchFailure, PageReport};
use crate::error::CrawlError;
use crate::extract::extract_listing_links;
use crate::fetch::Fetcher;
use crate::urls::listing_page_url;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

pub struct PageLister {
    fetcher: Arc<dyn Fetcher>,
    listing_url: Url,
    items: Arc<ItemResolver>,
}

impl PageLister {
    pub fn new(fetcher: Arc<dyn Fetcher>, listing_url: Url, items: Arc<ItemResolver>) -> Self {
        Self {
            fetcher,
            listing_url,
            items,
        }
    }

    pub async fn list(&self, page: u32) -> Result<PageReport, CrawlError> {
        let page_url = listing_page_url(&self.listing_url, page);
        info!(page, url = %page_url, "fetching listing page");

        let item_urls = self.fetch_item_links(&page_url).await?;
        info!(page, items = item_urls.len(), "listed page");

        let results = join_all(item_urls.iter().map(|url| self.items.resolve(url))).await;

        let mut report = PageReport {
            page,
            items: Vec::new(),
            failures: Vec::new(),
        };
        for (url, result) in item_urls.iter().zip(results) {
            match result {
                Ok(item) => report.items.push(item),
                Err(e) => {
                    error!(page, item = %url, error = %e, "item resolution failed");
                    report.failures.push(BranchFailure::new(url.as_str(), &e));
                }
            }
        }

        Ok(report)
    }

    async fn fetch_item_links(&self, page_url: &str) -> Result<Vec<String>, CrawlError> {
        let base = Url::parse(page_url).map_err(|e| CrawlError::malformed(page_url, e.to_string()))?;
        let response = self
            .fetcher
            .fetch(page_url)
            .await?
            .require_success(page_url)?;

        let links = extract_listing_links(&response.text(), &base).map_err(|source| {
            CrawlError::Structure {
                url: page_url.to_string(),
                source,
            }
        })?;

        Ok(links
            .into_iter()
            .filter(|link| !link.hidden)
            .map(|link| link.url)
            .collect())
    }
}
