// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// One command: harvest every asset reachable from a paginated listing.
//
//   listing-harvest https://example.com/archives/category/novels --output-dir pdfs
// =============================================================================

use crate::config::{DEFAULT_GATE_CAPACITY, DEFAULT_OUTPUT_DIR};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "listing-harvest",
    version,
    about = "Crawl a paginated listing and download every linked asset",
    long_about = "listing-harvest walks every page of a listing, opens each item it links to, \
                  and downloads the item's files into one directory. Files already on disk \
                  are skipped, so an interrupted run can simply be started again."
)]
pub struct Cli {
    /// Listing root URL; page N is fetched from <LISTING_URL>/page/N
    pub listing_url: String,

    /// Directory the assets are written to (created if missing)
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Value for the Origin and Referer headers
    ///
    /// Defaults to the listing URL's origin, e.g. https://example.com/
    #[arg(long)]
    pub origin: Option<String>,

    /// How many item pages may be fetched and parsed at once
    #[arg(long, default_value_t = DEFAULT_GATE_CAPACITY)]
    pub item_concurrency: usize,

    /// How many asset downloads may run at once
    #[arg(long, default_value_t = DEFAULT_GATE_CAPACITY)]
    pub asset_concurrency: usize,

    /// Seconds to wait before retrying a failed item or asset fetch
    #[arg(long, default_value_t = 60)]
    pub retry_delay_secs: u64,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the run summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
