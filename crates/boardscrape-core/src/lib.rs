//! Boardscrape Core - Foundation crate for the leaderboard scraper.
//!
//! This crate provides the data model that flows between the fetch, extract
//! and write stages, plus error handling and configuration management that
//! the other boardscrape crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Configuration error types using thiserror
//! - [`config`] - TOML-based configuration with environment overrides
//! - [`types`] - Shared data model (`RenderRequest`, `LeaderboardSnapshot`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use boardscrape_core::{AppConfig, ColumnSchema, LeaderboardSnapshot, Row, Timestamp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let columns = ColumnSchema::new(vec!["Provider".to_string(), "Model".to_string()]);
//! let rows = vec![Row::aligned(vec!["OpenAI".to_string()], columns.len())];
//! let snapshot = LeaderboardSnapshot::new(columns, rows, Timestamp::now(), &config.target.url);
//! assert_eq!(snapshot.rows()[0].values(), ["OpenAI", ""]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserSettings, ExtractionConfig, FetchConfig, InteractionConfig, LoggingConfig,
    OutputConfig, OutputFormat, TargetConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use types::{
    ColumnSchema, LeaderboardSnapshot, RenderRequest, RenderedDocument, Row, Timestamp,
};
