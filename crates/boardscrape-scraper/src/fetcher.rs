//! Page acquisition with retry and exponential backoff.
//!
//! Each attempt is a full render by the injected [`PageRenderer`], so the
//! browser lifecycle is scoped to one attempt. Transient failures are retried
//! up to the policy bound; anything else fails immediately.

use crate::error::{Result, ScrapeError};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use boardscrape_browser::{PageRenderer, RenderProgress};
use boardscrape_core::{RenderRequest, RenderedDocument};
use std::time::{Duration, Instant};

/// A successfully fetched page and what it took to get it.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final rendered markup
    pub document: RenderedDocument,
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Time across all attempts and backoff sleeps
    pub elapsed: Duration,
}

/// Renders one page, retrying transient failures.
pub struct Fetcher<R, S = TokioSleeper> {
    renderer: R,
    policy: RetryPolicy,
    sleeper: S,
}

impl<R: PageRenderer> Fetcher<R, TokioSleeper> {
    /// Create a fetcher that sleeps on the tokio timer.
    pub fn new(renderer: R, policy: RetryPolicy) -> Self {
        Self::with_sleeper(renderer, policy, TokioSleeper)
    }
}

impl<R: PageRenderer, S: Sleeper> Fetcher<R, S> {
    /// Create a fetcher with a custom sleeper.
    pub fn with_sleeper(renderer: R, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            renderer,
            policy,
            sleeper,
        }
    }

    /// Retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the requested page.
    ///
    /// Fails with [`ScrapeError::Fetch`] carrying the attempt count and the
    /// last underlying error once retries are exhausted.
    pub async fn fetch(
        &self,
        request: &RenderRequest,
        progress: &dyn RenderProgress,
    ) -> Result<FetchedPage> {
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            tracing::info!(
                url = request.url(),
                attempt,
                max_attempts,
                "Fetching page"
            );

            match self.renderer.render(request, progress).await {
                Ok(document) => {
                    let elapsed = started.elapsed();
                    tracing::info!(
                        url = request.url(),
                        attempt,
                        elapsed_ms = elapsed.as_millis(),
                        bytes = document.len(),
                        "Fetched page"
                    );
                    return Ok(FetchedPage {
                        document,
                        attempts: attempt,
                        elapsed,
                    });
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        url = request.url(),
                        attempt,
                        max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %e,
                        "Fetch attempt failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        url = request.url(),
                        attempt,
                        elapsed_ms = started.elapsed().as_millis(),
                        error = %e,
                        "Fetch failed"
                    );
                    return Err(ScrapeError::Fetch {
                        url: request.url().to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
