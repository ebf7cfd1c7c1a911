// src/pipeline/retry.rs
// =============================================================================
// Infinite retry with a fixed backoff.
//
// Unattended crawls run for hours against a site that drops connections and
// answers 5xx under load, so transient failures are retried forever.
// Errors classify themselves:
//
//   Transient -> log, sleep `backoff`, run the operation again
//   Terminal  -> stop; hand the condition back as a normal completion
//   Fatal     -> stop; return the error
// =============================================================================

use crate::error::CrawlError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Worth another attempt after the backoff
    Transient,
    /// Final, but not a failure (e.g. HTTP 404 on an asset)
    Terminal,
    /// A failure retrying cannot fix
    Fatal,
}

pub trait Classify {
    fn disposition(&self) -> Disposition;
}

impl Classify for CrawlError {
    fn disposition(&self) -> Disposition {
        match self {
            CrawlError::Fetch(e) if e.status() == Some(404) => Disposition::Terminal,
            CrawlError::Fetch(_) => Disposition::Transient,
            // A write inside an attempt failed; the next attempt refetches
            CrawlError::Io { .. } => Disposition::Transient,
            CrawlError::Structure { .. }
            | CrawlError::PageCount { .. }
            | CrawlError::MalformedUrl { .. }
            | CrawlError::GateClosed(_) => Disposition::Fatal,
        }
    }
}

/// How a retried operation ended, when it did not fail
#[derive(Debug)]
pub enum Completion<T, E> {
    Done(T),
    Terminal(E),
}

#[derive(Debug, Clone)]
pub struct RetryExecutor {
    backoff: Duration,
}

impl RetryExecutor {
    pub fn new(backoff: Duration) -> Self {
        Self { backoff }
    }

    // Runs `operation` until it succeeds, hits a terminal condition or fails
    // fatally. There is no attempt limit.
    //
    // Parameters:
    //   label: what is being retried, for the log lines (asset key, item URL)
    //   operation: builds a fresh future for every attempt
    pub async fn run<F, Fut, T, E>(&self, label: &str, mut operation: F) -> Result<Completion<T, E>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let mut attempt: u64 = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(task = label, attempts = attempt, "succeeded after retry");
                    }
                    return Ok(Completion::Done(value));
                }
                Err(e) => match e.disposition() {
                    Disposition::Transient => {
                        warn!(
                            task = label,
                            attempt,
                            delay_secs = self.backoff.as_secs_f64(),
                            error = %e,
                            "attempt failed, retrying"
                        );
                        tokio::time::sleep(self.backoff).await;
                        attempt += 1;
                    }
                    Disposition::Terminal => return Ok(Completion::Terminal(e)),
                    Disposition::Fatal => return Err(e),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, FetchError};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn transient() -> CrawlError {
        CrawlError::Fetch(FetchError::Status {
            url: "https://example.com/a".to_string(),
            status: 503,
        })
    }

    fn not_found() -> CrawlError {
        CrawlError::Fetch(FetchError::Status {
            url: "https://example.com/a".to_string(),
            status: 404,
        })
    }

    fn structural() -> CrawlError {
        CrawlError::Structure {
            url: "https://example.com/a".to_string(),
            source: ExtractError::MissingElement { selector: "select" },
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(transient().disposition(), Disposition::Transient);
        assert_eq!(not_found().disposition(), Disposition::Terminal);
        assert_eq!(structural().disposition(), Disposition::Fatal);

        let transport = CrawlError::Fetch(FetchError::Transport {
            url: "https://example.com/a".to_string(),
            reason: "Connection failed".to_string(),
        });
        assert_eq!(transport.disposition(), Disposition::Transient);

        let io = CrawlError::io("x", std::io::Error::other("disk"));
        assert_eq!(io.disposition(), Disposition::Transient);

        let malformed = CrawlError::malformed("https://x", "short");
        assert_eq!(malformed.disposition(), Disposition::Fatal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_no_retry() {
        let executor = RetryExecutor::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = executor
            .run("ok", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, CrawlError>(42)
                }
            })
            .await
            .unwrap();

        assert!(matches!(result, Completion::Done(42)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_retried_with_fixed_backoff() {
        let executor = RetryExecutor::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = executor
            .run("flaky", || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 5 {
                        Err(transient())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await
            .unwrap();

        assert!(matches!(result, Completion::Done("done")));
        assert_eq!(counter.load(Ordering::SeqCst), 6);
        // five fixed sleeps, no growth
        assert!(start.elapsed() >= Duration::from_secs(300));
        assert!(start.elapsed() < Duration::from_secs(301));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_stops_without_error() {
        let executor = RetryExecutor::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicU32::new(0));

        let result = executor
            .run("missing", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(not_found())
                }
            })
            .await
            .unwrap();

        assert!(matches!(result, Completion::Terminal(CrawlError::Fetch(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_propagates_without_retry() {
        let executor = RetryExecutor::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicU32::new(0));

        let result = executor
            .run("broken", || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(structural())
                }
            })
            .await;

        assert!(matches!(result, Err(CrawlError::Structure { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
