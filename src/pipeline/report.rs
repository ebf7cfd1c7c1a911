// src/pipeline/report.rs
// =============================================================================
// What a run produced, level by level.
//
// Each level reports its children once they have all finished: an item
// lists the outcome of every asset, a page lists its items plus the items
// that failed outright, and the summary lists every page. All of it
// serializes to JSON for `--json`.
// =============================================================================

use serde::Serialize;
use std::path::PathBuf;

/// Final state of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// Already on disk; no request was made
    Skipped { key: String, path: PathBuf },
    Downloaded { key: String, path: PathBuf, bytes: u64 },
    /// The server answered 404; nothing was written
    NotFound { key: String },
    Failed { url: String, reason: String },
}

impl DownloadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DownloadOutcome::Failed { .. })
    }
}

/// A page or item whose resolution failed; siblings are unaffected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchFailure {
    pub url: String,
    pub reason: String,
}

impl BranchFailure {
    pub fn new(url: impl Into<String>, error: &impl std::fmt::Display) -> Self {
        Self {
            url: url.into(),
            reason: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub url: String,
    /// False when the item page itself answered 404
    pub available: bool,
    pub assets: Vec<DownloadOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub page: u32,
    pub items: Vec<ItemReport>,
    pub failures: Vec<BranchFailure>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub total_pages: u32,
    pub pages: Vec<PageReport>,
    /// Pages that could not be listed
    pub failures: Vec<BranchFailure>,
}

impl CrawlSummary {
    pub fn assets(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .flat_map(|item| item.assets.iter())
    }

    pub fn items(&self) -> usize {
        self.pages.iter().map(|page| page.items.len()).sum()
    }

    pub fn downloaded(&self) -> usize {
        self.assets()
            .filter(|a| matches!(a, DownloadOutcome::Downloaded { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.assets()
            .filter(|a| matches!(a, DownloadOutcome::Skipped { .. }))
            .count()
    }

    pub fn not_found(&self) -> usize {
        self.assets()
            .filter(|a| matches!(a, DownloadOutcome::NotFound { .. }))
            .count()
    }

    pub fn failed_assets(&self) -> usize {
        self.assets().filter(|a| a.is_failure()).count()
    }

    /// Page-level and item-level failures together
    pub fn branch_failures(&self) -> impl Iterator<Item = &BranchFailure> {
        self.failures
            .iter()
            .chain(self.pages.iter().flat_map(|page| page.failures.iter()))
    }

    /// True when anything failed; 404s and skips are not failures
    pub fn has_failures(&self) -> bool {
        self.branch_failures().next().is_some() || self.failed_assets() > 0
    }
}
