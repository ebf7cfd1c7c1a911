// src/pipeline/asset.rs
// =============================================================================
// Downloads one asset to the output directory.
//
// How it works:
// 1. Derive the DedupKey (file name) from the URL
// 2. If that file already exists, stop: nothing is re-downloaded, ever
// 3. Take an AssetGate permit, then fetch-and-write under the retry policy
//    - 404            -> NotFound, no file
//    - other non-2xx  -> retry
//    - 2xx            -> write "<key>.part", rename to "<key>"
//
// A failed attempt never leaves a file behind under the final name, so the
// skip check in step 2 only ever sees complete downloads.
// =============================================================================

use super::gate::ConcurrencyGate;
use super::report::DownloadOutcome;
use super::retry::{Completion, RetryExecutor};
use crate::error::CrawlError;
use crate::fetch::Fetcher;
use crate::urls::{dedup_key, partial_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct AssetDownloader {
    fetcher: Arc<dyn Fetcher>,
    gate: ConcurrencyGate,
    retry: RetryExecutor,
    output_dir: PathBuf,
}

impl AssetDownloader {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        gate: ConcurrencyGate,
        retry: RetryExecutor,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            gate,
            retry,
            output_dir: output_dir.into(),
        }
    }

    pub async fn download(&self, url: &str) -> Result<DownloadOutcome, CrawlError> {
        let key = dedup_key(url)?;
        let path = self.output_dir.join(&key);

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| CrawlError::io(&path, e))?;
        if exists {
            debug!(asset = %key, "already downloaded, skipping");
            return Ok(DownloadOutcome::Skipped { key, path });
        }

        let _permit = self.gate.acquire().await?;
        info!(asset = %key, url, "downloading");

        let target = path.as_path();
        let completion = self
            .retry
            .run(&key, move || self.fetch_and_store(url, target))
            .await?;

        match completion {
            Completion::Done(bytes) => {
                info!(asset = %key, bytes, "downloaded");
                Ok(DownloadOutcome::Downloaded { key, path, bytes })
            }
            Completion::Terminal(e) => {
                error!(asset = %key, error = %e, "asset not found, skipping");
                Ok(DownloadOutcome::NotFound { key })
            }
        }
    }

    // One attempt: fetch the whole body, then write it. Any failure here is
    // retried as a unit by the caller.
    async fn fetch_and_store(&self, url: &str, path: &Path) -> Result<u64, CrawlError> {
        let response = self.fetcher.fetch(url).await?.require_success(url)?;
        write_atomically(path, &response.body).await?;
        Ok(response.body.len() as u64)
    }
}

async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), CrawlError> {
    let partial = partial_path(path);

    if let Err(e) = tokio::fs::write(&partial, body).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(CrawlError::io(&partial, e));
    }

    if let Err(e) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(CrawlError::io(path, e));
    }

    Ok(())
}
