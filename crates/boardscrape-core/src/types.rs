//! Shared types used across the scraper stages.
//!
//! The fetch stage produces a [`RenderedDocument`] for a [`RenderRequest`],
//! the extract stage turns it into a [`LeaderboardSnapshot`], and the write
//! stage serializes that snapshot. Nothing here is mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to render: one page, with or without header interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    url: String,
    interact: bool,
}

impl RenderRequest {
    /// Create a new request for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, interact: bool) -> Self {
        Self {
            url: url.into(),
            interact,
        }
    }

    /// Target page URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether header controls should be clicked before capture.
    #[must_use]
    pub fn interact(&self) -> bool {
        self.interact
    }
}

/// Fully rendered page markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    /// Wrap rendered HTML.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Borrow the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the markup in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the markup is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RenderedDocument {
    fn from(html: String) -> Self {
        Self(html)
    }
}

/// Ordered column names derived from the table's header row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnSchema(Vec<String>);

impl ColumnSchema {
    /// Create a schema from header names in document order.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Iterate over column names.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ColumnSchema {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One data row, one value per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(Vec<String>);

impl Row {
    /// Build a row of exactly `width` values.
    ///
    /// Missing trailing values become empty strings; values beyond `width`
    /// are dropped.
    #[must_use]
    pub fn aligned(mut values: Vec<String>, width: usize) -> Self {
        values.resize(width, String::new());
        Self(values)
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every value is the empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }
}

/// One complete extracted result set for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardSnapshot {
    columns: ColumnSchema,
    rows: Vec<Row>,
    scraped_at: Timestamp,
    source_url: String,
}

impl LeaderboardSnapshot {
    /// Assemble a snapshot. Rows are re-aligned to the schema width so every
    /// row has exactly `columns.len()` values.
    #[must_use]
    pub fn new(
        columns: ColumnSchema,
        rows: Vec<Row>,
        scraped_at: Timestamp,
        source_url: impl Into<String>,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                if row.len() == width {
                    row
                } else {
                    Row::aligned(row.0, width)
                }
            })
            .collect();

        Self {
            columns,
            rows,
            scraped_at,
            source_url: source_url.into(),
        }
    }

    /// Column schema.
    #[must_use]
    pub fn columns(&self) -> &ColumnSchema {
        &self.columns
    }

    /// Data rows in source document order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// When the page was scraped.
    #[must_use]
    pub fn scraped_at(&self) -> Timestamp {
        self.scraped_at
    }

    /// Page the data came from.
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Fixed-width `YYYYMMDD_HHMMSS` form used in output file names.
    #[must_use]
    pub fn file_suffix(&self) -> String {
        self.0.format("%Y%m%d_%H%M%S").to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
