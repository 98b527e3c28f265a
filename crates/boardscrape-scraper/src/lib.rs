//! Boardscrape Scraper - fetch, extract and write stages.
//!
//! This crate turns a JavaScript-rendered leaderboard page into a delimited
//! file. Pages are rendered through a [`boardscrape_browser::PageRenderer`]
//! with bounded retries, the first structurally valid table is extracted into
//! a [`boardscrape_core::LeaderboardSnapshot`], and the snapshot is written
//! atomically to a timestamp-suffixed path.
//!
//! # Features
//!
//! - Retry with exponential backoff for transient browser failures
//! - Per-cell extraction rules for text, logo images and composite cells
//! - Multi-row header selection and nested-table isolation
//! - CSV or TSV output with standard quoting
//!
//! # Example
//!
//! ```rust,ignore
//! use boardscrape_browser::NoProgress;
//! use boardscrape_core::AppConfig;
//! use boardscrape_scraper::Pipeline;
//!
//! let config = AppConfig::load_with_env(None)?;
//! let pipeline = Pipeline::from_config(&config)?;
//! let summary = pipeline.run(&NoProgress).await?;
//! println!("{} rows -> {}", summary.rows, summary.output.display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cell;
#[allow(missing_docs)]
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod retry;
pub mod writer;

pub use cell::Cell;
pub use error::{Result, ScrapeError, WriteFailureKind};
pub use extractor::TableExtractor;
pub use fetcher::{FetchedPage, Fetcher};
pub use pipeline::{Collected, Pipeline, RunSummary};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use writer::{timestamped_path, SnapshotWriter, WrittenFileInfo};
