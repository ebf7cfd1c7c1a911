// src/config.rs
// =============================================================================
// Validated run configuration.
//
// The CLI collects raw arguments; CrawlConfig is what the pipeline runs on:
// a parsed listing URL, the header origin, and the two gate capacities.
// =============================================================================

use crate::cli::Cli;
use crate::urls::site_origin;
use anyhow::{ensure, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_GATE_CAPACITY: usize = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
pub const DEFAULT_OUTPUT_DIR: &str = "pdfs";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Listing root; page n lives at "{listing_url}/page/{n}"
    pub listing_url: Url,
    /// Sent as both Origin and Referer
    pub origin: String,
    pub output_dir: PathBuf,
    pub item_concurrency: usize,
    pub asset_concurrency: usize,
    pub retry_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl CrawlConfig {
    // Defaults for everything except the listing URL and output directory
    pub fn new(listing_url: &str, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let listing_url = parse_listing_url(listing_url)?;
        let origin = site_origin(&listing_url);

        Ok(Self {
            listing_url,
            origin,
            output_dir: output_dir.into(),
            item_concurrency: DEFAULT_GATE_CAPACITY,
            asset_concurrency: DEFAULT_GATE_CAPACITY,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: None,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Self::new(&cli.listing_url, &cli.output_dir)?;

        if let Some(origin) = &cli.origin {
            config.origin = origin.clone();
        }

        ensure!(cli.item_concurrency > 0, "--item-concurrency must be at least 1");
        ensure!(cli.asset_concurrency > 0, "--asset-concurrency must be at least 1");
        config.item_concurrency = cli.item_concurrency;
        config.asset_concurrency = cli.asset_concurrency;
        config.retry_delay = Duration::from_secs(cli.retry_delay_secs);
        config.request_timeout = cli.timeout_secs.map(Duration::from_secs);

        Ok(config)
    }
}

fn parse_listing_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid listing URL '{}'", raw))?;
    ensure!(
        matches!(url.scheme(), "http" | "https"),
        "listing URL must be http or https: {}",
        raw
    );
    ensure!(url.host().is_some(), "listing URL has no host: {}", raw);
    Ok(url)
}
