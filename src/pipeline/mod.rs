// src/pipeline/mod.rs
// =============================================================================
// The fetch / retry / dedup pipeline.
//
//   Orchestrator -> N x PageLister -> M x ItemResolver -> K x AssetDownloader
//
// Each level waits for all of its children. Two gates bound the work that
// matters (item pages in flight, asset bodies in flight), and transient
// failures are retried forever by a single RetryExecutor policy.
// =============================================================================

mod asset;
mod gate;
mod item;
mod orchestrator;
mod page;
mod report;
mod retry;

pub use orchestrator::Orchestrator;
pub use report::{CrawlSummary, DownloadOutcome};
