// src/pipeline/item.rs
// =============================================================================
// Resolves one item page into its assets and downloads them.
//
// The ItemGate permit only covers fetching and parsing the item page. It is
// dropped before the asset fan-out, so items being parsed and assets being
// downloaded are bounded independently.
//
// A document without the expected asset selector is a structural failure:
// it is returned as this item's error without retrying, and no assets are
// downloaded for the item.
// =============================================================================

use super::asset::AssetDownloader;
use super::gate::ConcurrencyGate;
use super::report::{DownloadOutcome, ItemReport};
use super::retry::{Completion, RetryExecutor};
use crate::error::CrawlError;
use crate::extract::extract_asset_links;
use crate::fetch::Fetcher;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

pub struct ItemResolver {
    fetcher: Arc<dyn Fetcher>,
    gate: ConcurrencyGate,
    retry: RetryExecutor,
    assets: Arc<AssetDownloader>,
}

impl ItemResolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        gate: ConcurrencyGate,
        retry: RetryExecutor,
        assets: Arc<AssetDownloader>,
    ) -> Self {
        Self {
            fetcher,
            gate,
            retry,
            assets,
        }
    }

    pub async fn resolve(&self, item_url: &str) -> Result<ItemReport, CrawlError> {
        let asset_urls = {
            let _permit = self.gate.acquire().await?;

            let completion = self
                .retry
                .run(item_url, move || self.fetch_asset_links(item_url))
                .await?;

            match completion {
                Completion::Done(urls) => urls,
                Completion::Terminal(e) => {
                    warn!(item = item_url, error = %e, "item page not found, skipping");
                    return Ok(ItemReport {
                        url: item_url.to_string(),
                        available: false,
                        assets: Vec::new(),
                    });
                }
            }
        };

        info!(item = item_url, assets = asset_urls.len(), "resolved item");

        // join_all waits for every download; none is cancelled by a sibling
        let assets = join_all(asset_urls.iter().map(|url| self.download_one(url))).await;

        Ok(ItemReport {
            url: item_url.to_string(),
            available: true,
            assets,
        })
    }

    async fn fetch_asset_links(&self, item_url: &str) -> Result<Vec<String>, CrawlError> {
        let base = Url::parse(item_url).map_err(|e| CrawlError::malformed(item_url, e.to_string()))?;
        let response = self
            .fetcher
            .fetch(item_url)
            .await?
            .require_success(item_url)?;

        extract_asset_links(&response.text(), &base).map_err(|source| CrawlError::Structure {
            url: item_url.to_string(),
            source,
        })
    }

    async fn download_one(&self, url: &str) -> DownloadOutcome {
        match self.assets.download(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(url, error = %e, "asset failed");
                DownloadOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
