//! Leaderboard table extraction from rendered markup.
//!
//! Tables are read through their own section elements (`thead`, `tbody`,
//! bare `tr`) so rows of nested tables never leak into the outer one.

use crate::cell::{flatten_text, is_provider_column, Cell};
use crate::error::{Result, ScrapeError};
use boardscrape_core::{
    ColumnSchema, ExtractionConfig, LeaderboardSnapshot, RenderedDocument, Row, Timestamp,
};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

fn table_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("table").expect("valid selector"))
}

/// Iframes, ARIA tables and the framework's data script, in that order.
fn diagnostics_selectors() -> &'static [Selector; 3] {
    static SELECTORS: OnceLock<[Selector; 3]> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        [
            Selector::parse("iframe").expect("valid selector"),
            Selector::parse(r#"[role="table"]"#).expect("valid selector"),
            Selector::parse("script#__NEXT_DATA__").expect("valid selector"),
        ]
    })
}

/// Header cells and data rows of one table.
struct TableLayout<'a> {
    header: Vec<ElementRef<'a>>,
    body: Vec<ElementRef<'a>>,
}

/// Turns a rendered document into a [`LeaderboardSnapshot`].
#[derive(Debug, Clone)]
pub struct TableExtractor {
    candidates: Option<Selector>,
    provider_keywords: Vec<String>,
}

impl TableExtractor {
    /// Build an extractor, compiling the optional table selector.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let candidates = config
            .table_selector
            .as_deref()
            .map(|css| {
                Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
                    selector: css.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            candidates,
            provider_keywords: config.provider_keywords.clone(),
        })
    }

    /// Extract the leaderboard, stamping it with the current time.
    pub fn extract(
        &self,
        document: &RenderedDocument,
        source_url: &str,
    ) -> Result<LeaderboardSnapshot> {
        self.extract_at(document, source_url, Timestamp::now())
    }

    /// Extract the leaderboard with an explicit timestamp.
    pub fn extract_at(
        &self,
        document: &RenderedDocument,
        source_url: &str,
        scraped_at: Timestamp,
    ) -> Result<LeaderboardSnapshot> {
        let html = Html::parse_document(document.as_str());
        let tables = self.candidate_tables(&html);

        if tables.is_empty() {
            log_missing_table(&html);
            return Err(ScrapeError::NoTableFound);
        }

        let mut parsed: Vec<(ColumnSchema, Vec<Row>)> = tables
            .iter()
            .filter_map(|table| read_layout(*table))
            .map(|layout| self.read_table(&layout))
            .collect();

        if parsed.is_empty() {
            return Err(ScrapeError::MalformedTable {
                reason: format!("{} table(s) found but none has a header row", tables.len()),
            });
        }

        let populated = parsed.iter().filter(|(_, rows)| !rows.is_empty()).count();
        if populated > 1 {
            tracing::warn!(
                candidates = populated,
                "Several tables hold data; using the first one"
            );
        }
        let index = parsed
            .iter()
            .position(|(_, rows)| !rows.is_empty())
            .unwrap_or(0);
        let (columns, rows) = parsed.swap_remove(index);

        tracing::info!(
            rows = rows.len(),
            columns = columns.len(),
            tables = tables.len(),
            scraped_at = %scraped_at,
            "Extracted table"
        );
        if rows.is_empty() {
            tracing::warn!("Table has a header but no data rows");
        }

        Ok(LeaderboardSnapshot::new(columns, rows, scraped_at, source_url))
    }

    /// Tables in document order, narrowed by the configured selector.
    fn candidate_tables<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        let Some(selector) = &self.candidates else {
            return html.select(table_selector()).collect();
        };

        let mut tables: Vec<ElementRef<'a>> = Vec::new();
        for matched in html.select(selector) {
            let found: Vec<ElementRef<'a>> = if matched.value().name() == "table" {
                vec![matched]
            } else {
                matched.select(table_selector()).collect()
            };
            for table in found {
                if !tables.iter().any(|t| t.id() == table.id()) {
                    tables.push(table);
                }
            }
        }
        tables
    }

    fn read_table(&self, layout: &TableLayout<'_>) -> (ColumnSchema, Vec<Row>) {
        let names: Vec<String> = layout.header.iter().map(|c| flatten_text(*c)).collect();
        let provider: Vec<bool> = names
            .iter()
            .map(|name| is_provider_column(name, &self.provider_keywords))
            .collect();
        let width = names.len();

        let rows = layout
            .body
            .iter()
            .map(|tr| {
                let values = row_cells(*tr)
                    .into_iter()
                    .take(width)
                    .zip(&provider)
                    .map(|(cell, provider_column)| Cell::inspect(cell).value(*provider_column))
                    .collect();
                Row::aligned(values, width)
            })
            .filter(|row| !row.is_blank())
            .collect();

        (ColumnSchema::new(names), rows)
    }
}

/// Locate the header row and data rows of a table, if it has a header.
fn read_layout(table: ElementRef<'_>) -> Option<TableLayout<'_>> {
    let mut head_rows = Vec::new();
    let mut body_rows = Vec::new();

    for section in child_elements(table) {
        match section.value().name() {
            "thead" => head_rows.extend(child_rows(section)),
            "tbody" => body_rows.extend(child_rows(section)),
            "tr" => body_rows.push(section),
            _ => {}
        }
    }

    // max_by_key keeps the last of equal maxima
    let best_head = head_rows
        .iter()
        .map(|tr| row_cells(*tr))
        .filter(|cells| !cells.is_empty())
        .max_by_key(|cells| {
            cells
                .iter()
                .filter(|c| !flatten_text(**c).is_empty())
                .count()
        });

    if let Some(header) = best_head {
        return Some(TableLayout {
            header,
            body: body_rows,
        });
    }

    let header_at = body_rows
        .iter()
        .position(|tr| row_cells(*tr).iter().any(|c| c.value().name() == "th"))?;
    Some(TableLayout {
        header: row_cells(body_rows[header_at]),
        body: body_rows.split_off(header_at + 1),
    })
}

fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

fn child_rows(section: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    child_elements(section).filter(|el| el.value().name() == "tr")
}

fn row_cells(tr: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    child_elements(tr)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

fn log_missing_table(html: &Html) {
    let [iframes, role_tables, next_data] = diagnostics_selectors();
    tracing::debug!(
        iframes = html.select(iframes).count(),
        role_tables = html.select(role_tables).count(),
        next_data = html.select(next_data).next().is_some(),
        "No <table> element in document"
    );
}
