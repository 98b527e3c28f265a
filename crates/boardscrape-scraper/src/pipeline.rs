//! One scrape run: fetch, extract, write.
//!
//! The run is strictly sequential. Nothing is written unless a snapshot was
//! extracted, and a failed write leaves the snapshot with the caller.

use crate::error::Result;
use crate::extractor::TableExtractor;
use crate::fetcher::Fetcher;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::writer::{SnapshotWriter, WrittenFileInfo};
use boardscrape_browser::{ChromiumRenderer, PageRenderer, RenderProgress};
use boardscrape_core::{AppConfig, LeaderboardSnapshot, RenderRequest};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// An extracted snapshot and the number of fetch attempts it took.
#[derive(Debug, Clone)]
pub struct Collected {
    /// The extracted leaderboard
    pub snapshot: LeaderboardSnapshot,
    /// Fetch attempts, including the successful one
    pub attempts: u32,
}

/// Outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Fetch attempts, including the successful one
    pub attempts: u32,
    /// Data rows written
    pub rows: usize,
    /// Columns in the header
    pub columns: usize,
    /// Final output path
    pub output: PathBuf,
    /// Wall time for the whole run
    pub elapsed: Duration,
}

/// Wires the three stages together for a single target.
pub struct Pipeline<R, S = TokioSleeper> {
    fetcher: Fetcher<R, S>,
    extractor: TableExtractor,
    writer: SnapshotWriter,
    request: RenderRequest,
    output_path: PathBuf,
}

impl Pipeline<ChromiumRenderer> {
    /// Build a Chromium-backed pipeline from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let renderer = ChromiumRenderer::new(config.browser.clone(), config.interaction.clone());
        let fetcher = Fetcher::new(renderer, RetryPolicy::from_config(&config.fetch));

        Ok(Self::new(
            fetcher,
            TableExtractor::new(&config.extraction)?,
            SnapshotWriter::from_config(&config.output),
            RenderRequest::new(config.target.url.clone(), config.target.interact),
            config.output.path.clone(),
        ))
    }
}

impl<R: PageRenderer, S: Sleeper> Pipeline<R, S> {
    /// Assemble a pipeline from already-built stages.
    #[must_use]
    pub fn new(
        fetcher: Fetcher<R, S>,
        extractor: TableExtractor,
        writer: SnapshotWriter,
        request: RenderRequest,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            writer,
            request,
            output_path: output_path.into(),
        }
    }

    /// Page requested on every run.
    #[must_use]
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// Output path before the timestamp suffix is added.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Fetch the page and extract its leaderboard.
    pub async fn collect(&self, progress: &dyn RenderProgress) -> Result<Collected> {
        let page = self.fetcher.fetch(&self.request, progress).await?;
        let snapshot = self
            .extractor
            .extract(&page.document, self.request.url())?;

        Ok(Collected {
            snapshot,
            attempts: page.attempts,
        })
    }

    /// Write a collected snapshot to the configured output path.
    pub fn save(&self, snapshot: &LeaderboardSnapshot) -> Result<WrittenFileInfo> {
        self.writer.write(snapshot, &self.output_path)
    }

    /// Run all three stages.
    pub async fn run(&self, progress: &dyn RenderProgress) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!(url = self.request.url(), "Starting scrape");

        let collected = self.collect(progress).await?;
        let written = self.save(&collected.snapshot)?;

        let summary = RunSummary {
            attempts: collected.attempts,
            rows: written.rows,
            columns: collected.snapshot.columns().len(),
            output: written.path,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            attempts = summary.attempts,
            rows = summary.rows,
            columns = summary.columns,
            output = %summary.output.display(),
            elapsed_ms = summary.elapsed.as_millis(),
            "Scrape complete"
        );

        Ok(summary)
    }
}
