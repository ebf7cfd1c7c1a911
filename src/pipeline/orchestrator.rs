// src/pipeline/orchestrator.rs
// =============================================================================
// Runs a whole harvest.
//
// 1. Fetch the listing root once and read the total page count from its
//    pagination control (fatal if missing: nothing can be discovered)
// 2. Make sure the output directory exists
// 3. List every page 1..=total concurrently and wait for the whole tree
//
// The two gates live here for the lifetime of the run and are handed to the
// item and asset levels. Pages are not gated: a listing fetch is cheap, and
// the real bottleneck is item pages and asset bodies.
// =============================================================================

use super::asset::AssetDownloader;
use super::gate::ConcurrencyGate;
use super::item::ItemResolver;
use super::page::PageLister;
use super::report::{BranchFailure, CrawlSummary};
use super::retry::RetryExecutor;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::extract::extract_page_count;
use crate::fetch::Fetcher;
use crate::urls::listing_page_url;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

pub struct Orchestrator {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    item_gate: ConcurrencyGate,
    asset_gate: ConcurrencyGate,
}

impl Orchestrator {
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let item_gate = ConcurrencyGate::new("item", config.item_concurrency);
        let asset_gate = ConcurrencyGate::new("asset", config.asset_concurrency);

        Self {
            config,
            fetcher,
            item_gate,
            asset_gate,
        }
    }

    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let total_pages = self.discover_page_count().await?;
        info!(pages = total_pages, "discovered listing pages");

        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .map_err(|e| CrawlError::io(&self.config.output_dir, e))?;

        let lister = self.build_pipeline();
        let results = join_all((1..=total_pages).map(|page| lister.list(page))).await;

        let mut summary = CrawlSummary {
            total_pages,
            ..CrawlSummary::default()
        };
        for (page, result) in (1..=total_pages).zip(results) {
            match result {
                Ok(report) => summary.pages.push(report),
                Err(e) => {
                    error!(page, error = %e, "listing page failed");
                    let url = listing_page_url(&self.config.listing_url, page);
                    summary.failures.push(BranchFailure::new(url, &e));
                }
            }
        }

        info!(
            pages = total_pages,
            items = summary.items(),
            downloaded = summary.downloaded(),
            skipped = summary.skipped(),
            not_found = summary.not_found(),
            failed = summary.failed_assets() + summary.branch_failures().count(),
            "harvest finished"
        );

        Ok(summary)
    }

    async fn discover_page_count(&self) -> Result<u32, CrawlError> {
        let root = self.config.listing_url.as_str();
        info!(url = root, "fetching listing root");

        let response = self.fetcher.fetch(root).await?.require_success(root)?;

        extract_page_count(&response.text()).map_err(|source| CrawlError::PageCount {
            url: root.to_string(),
            source,
        })
    }

    // Wires asset -> item -> page, sharing the run's gates and retry policy
    fn build_pipeline(&self) -> PageLister {
        let retry = RetryExecutor::new(self.config.retry_delay);

        let assets = Arc::new(AssetDownloader::new(
            self.fetcher.clone(),
            self.asset_gate.clone(),
            retry.clone(),
            self.config.output_dir.clone(),
        ));
        let items = Arc::new(ItemResolver::new(
            self.fetcher.clone(),
            self.item_gate.clone(),
            retry,
            assets,
        ));

        PageLister::new(self.fetcher.clone(), self.config.listing_url.clone(), items)
    }
}
