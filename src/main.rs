// src/main.rs
// =============================================================================
// Entry point of the listing-harvest CLI.
//
// What happens here:
// 1. Install the tracing subscriber (RUST_LOG, default "info", on stderr)
// 2. Parse arguments and build the run configuration
// 3. Run the orchestrator over the whole listing
// 4. Print the summary (table or JSON) and exit:
//    0 = clean run, 1 = run finished with failures, 2 = fatal error
// =============================================================================

mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod pipeline;
mod urls;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::CrawlConfig;
use fetch::HttpFetcher;
use pipeline::{CrawlSummary, DownloadOutcome, Orchestrator};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("harvest aborted: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every branch finished cleanly
//   Ok(1) = the run finished, but some pages, items or assets failed
//   Err   = nothing could be harvested (bad config, root page, page count)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = CrawlConfig::from_cli(&cli)?;

    let fetcher = HttpFetcher::new(&config.origin, config.request_timeout)?;
    let orchestrator = Orchestrator::new(config, Arc::new(fetcher));

    let summary = orchestrator.run().await?;
    print_results(&summary, cli.json)?;

    if summary.has_failures() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_results(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_table(summary);
    }
    Ok(())
}

fn print_table(summary: &CrawlSummary) {
    let failures: Vec<(&str, &str)> = summary
        .branch_failures()
        .map(|f| (f.url.as_str(), f.reason.as_str()))
        .chain(summary.assets().filter_map(|a| match a {
            DownloadOutcome::Failed { url, reason } => Some((url.as_str(), reason.as_str())),
            _ => None,
        }))
        .collect();

    if !failures.is_empty() {
        println!("{:<60} {:<45}", "FAILED URL", "REASON");
        println!("{}", "=".repeat(105));
        for (url, reason) in &failures {
            println!("{:<60} {:<45}", truncate(url, 57), reason);
        }
        println!();
    }

    println!("Summary:");
    println!("   Pages:      {}", summary.total_pages);
    println!("   Items:      {}", summary.items());
    println!("   Downloaded: {}", summary.downloaded());
    println!("   Skipped:    {}", summary.skipped());
    println!("   Not found:  {}", summary.not_found());
    println!("   Failed:     {}", failures.len());
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_url() {
        let url = "https://example.com/".to_string() + &"a".repeat(80);
        let shown = truncate(&url, 57);
        assert_eq!(shown.chars().count(), 60);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_url() {
        assert_eq!(truncate("https://example.com", 57), "https://example.com");
    }

    #[test]
    fn test_cli_parses_listing_url() {
        let cli = Cli::try_parse_from([
            "listing-harvest",
            "https://example.com/archives/category/novels",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.listing_url, "https://example.com/archives/category/novels");
        assert!(cli.json);
    }
}
