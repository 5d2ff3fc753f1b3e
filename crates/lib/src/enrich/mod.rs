//! # Batch Enrichment
//!
//! This module drives the enrichment of a whole collection: it reads the schema
//! and rows once, extracts metadata for every row's URL, and writes the results
//! back. Rows run concurrently inside a batch and batches run one after another
//! with a fixed pause between them, as a courtesy to the record store's rate
//! limits. A row's failure is reported in its status line and never stops the
//! rest of the run.

pub mod mapping;

use crate::errors::EnrichError;
use crate::traits::{MetadataSource, RecordStore};
use crate::types::{ArticleMetadata, Row, Schema};
use futures::future::join_all;
use mapping::{build_property, content_paragraphs, summarize, FieldMapping, TargetField};
use serde_json::Map;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

pub use mapping::parse_authors;

/// Rows with fewer existing content blocks than this get the article body appended.
///
/// A page holding only its title has no blocks; anything above a couple of blocks
/// is treated as already written by someone. This is an approximation.
pub const APPEND_BLOCK_THRESHOLD: usize = 3;

/// Caller-declared destination field names. Unset fields are resolved from
/// built-in candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOverrides {
    pub url: Option<String>,
    pub publication: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub summary: Option<String>,
}

/// Options for a single enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// The collection (e.g. Notion database) to enrich.
    pub collection_id: String,
    pub overrides: FieldOverrides,
    /// Number of rows processed concurrently.
    pub batch_size: usize,
    /// Maximum number of rows read from the collection.
    pub limit: usize,
    /// Write a naive summary of the body when a summary field exists.
    pub generate_summary: bool,
    /// Replace underlying error messages with generic ones in status lines.
    pub silent_errors: bool,
    /// Pause between two consecutive batches.
    pub batch_delay: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            collection_id: String::new(),
            overrides: FieldOverrides::default(),
            batch_size: 5,
            limit: 100,
            generate_summary: false,
            silent_errors: false,
            batch_delay: Duration::from_millis(1000),
        }
    }
}

/// The outcome of an enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// One status line per row, in row order.
    pub details: Vec<String>,
}

impl fmt::Display for EnrichReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} URLs\n{} successful\n{} failed\n\nDetails:\n{}",
            self.processed,
            self.succeeded,
            self.failed,
            self.details.join("\n")
        )
    }
}

struct RowOutcome {
    success: bool,
    line: String,
}

impl RowOutcome {
    fn succeeded(line: String) -> Self {
        Self {
            success: true,
            line,
        }
    }

    fn failed(line: String) -> Self {
        Self {
            success: false,
            line,
        }
    }
}

/// Everything a row task needs, resolved once per run.
struct RunContext<'a> {
    store: &'a dyn RecordStore,
    source: &'a dyn MetadataSource,
    schema: Schema,
    mapping: FieldMapping,
    options: &'a EnrichOptions,
}

/// Enriches every row of a collection with metadata extracted from its URL.
///
/// Only a failure to read the schema or the row list aborts the run; every other
/// failure is confined to its row and shows up in the report.
pub async fn run_enrichment(
    store: &dyn RecordStore,
    source: &dyn MetadataSource,
    options: &EnrichOptions,
) -> Result<EnrichReport, EnrichError> {
    if options.batch_size == 0 {
        return Err(EnrichError::InvalidOptions(
            "batch size must be at least 1".into(),
        ));
    }

    let schema = store
        .retrieve_schema(&options.collection_id)
        .await
        .map_err(EnrichError::Schema)?;
    let mapping = FieldMapping::resolve(&schema, &options.overrides);
    info!(?mapping, "Resolved destination fields");

    let mut rows = store
        .query_rows(&options.collection_id, options.limit)
        .await
        .map_err(EnrichError::Query)?;
    rows.truncate(options.limit);
    info!(
        "Fetched {} rows from collection {}",
        rows.len(),
        options.collection_id
    );

    let ctx = RunContext {
        store,
        source,
        schema,
        mapping,
        options,
    };

    let mut report = EnrichReport::default();
    let batch_count = rows.len().div_ceil(options.batch_size);
    for (index, batch) in rows.chunks(options.batch_size).enumerate() {
        if index > 0 {
            tokio::time::sleep(options.batch_delay).await;
        }
        info!(
            "Processing batch {}/{} ({} rows)",
            index + 1,
            batch_count,
            batch.len()
        );

        let outcomes = join_all(batch.iter().map(|row| process_row(&ctx, row))).await;
        for outcome in outcomes {
            report.processed += 1;
            if outcome.success {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            report.details.push(outcome.line);
        }
    }

    info!(
        "Enrichment finished: {} processed, {} successful, {} failed",
        report.processed, report.succeeded, report.failed
    );
    Ok(report)
}

async fn process_row(ctx: &RunContext<'_>, row: &Row) -> RowOutcome {
    let Some(url) = row.url_in(&ctx.mapping.url) else {
        warn!("Row {} has no URL in field '{}'", row.id, ctx.mapping.url);
        return RowOutcome::failed(format!(
            "⚠️ Row {}: no URL found in '{}', skipped",
            row.id, ctx.mapping.url
        ));
    };

    let metadata = match ctx.source.extract(&url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Extraction failed for {}: {}", url, e);
            return RowOutcome::failed(error_line(ctx, &url, "failed to fetch page", &e));
        }
    };

    let (properties, written, skipped) = build_properties(ctx, &metadata);
    if !properties.is_empty() {
        if let Err(e) = ctx.store.update_row(&row.id, properties).await {
            warn!("Update failed for row {} ({}): {}", row.id, url, e);
            return RowOutcome::failed(error_line(ctx, &url, "failed to update row", &e));
        }
    }

    let mut appended = 0;
    if !metadata.content.is_empty() {
        match append_content(ctx, &row.id, &metadata.content).await {
            Ok(count) => appended = count,
            Err(e) => {
                warn!("Content append failed for row {} ({}): {}", row.id, url, e);
                return RowOutcome::failed(error_line(ctx, &url, "failed to append content", &e));
            }
        }
    }

    let mut line = if written.is_empty() {
        format!("✅ {url}: no metadata found")
    } else {
        format!("✅ {url}: updated {}", written.join(", "))
    };
    if appended > 0 {
        line.push_str(&format!("; appended {appended} content blocks"));
    }
    if !skipped.is_empty() {
        line.push_str(&format!(" (skipped {})", skipped.join("; ")));
    }
    info!("{}", line);
    RowOutcome::succeeded(line)
}

/// Builds the payloads for every non-empty metadata value.
///
/// Returns the payload map, the names of the fields it writes and a note for every
/// value that could not be written.
fn build_properties(
    ctx: &RunContext<'_>,
    metadata: &ArticleMetadata,
) -> (Map<String, serde_json::Value>, Vec<String>, Vec<String>) {
    let summary = if ctx.options.generate_summary {
        summarize(&metadata.content)
    } else {
        String::new()
    };
    let values = [
        (TargetField::Publication, metadata.publication.as_str()),
        (TargetField::Author, metadata.author.as_str()),
        (TargetField::Date, metadata.date.as_str()),
        (TargetField::Summary, summary.as_str()),
    ];

    let mut properties = Map::new();
    let mut written = Vec::new();
    let mut skipped = Vec::new();
    for (target, value) in values {
        if value.trim().is_empty() {
            continue;
        }
        let field = ctx.mapping.get(target);
        let Some(kind) = ctx.schema.kind(field) else {
            // A summary is only written when the collection has somewhere to put it.
            if target != TargetField::Summary {
                skipped.push(format!("{field}: not in schema"));
            }
            continue;
        };
        match build_property(kind, target, value) {
            Ok(payload) => {
                properties.insert(field.to_string(), payload);
                written.push(field.to_string());
            }
            Err(e) => skipped.push(format!("{field}: {e}")),
        }
    }
    (properties, written, skipped)
}

async fn append_content(
    ctx: &RunContext<'_>,
    row_id: &str,
    content: &str,
) -> Result<usize, crate::errors::StoreError> {
    let existing = ctx.store.list_blocks(row_id).await?;
    if existing.len() >= APPEND_BLOCK_THRESHOLD {
        return Ok(0);
    }
    let paragraphs = content_paragraphs(content);
    ctx.store.append_blocks(row_id, &paragraphs).await?;
    Ok(paragraphs.len())
}

fn error_line(ctx: &RunContext<'_>, url: &str, generic: &str, error: &dyn fmt::Display) -> String {
    if ctx.options.silent_errors {
        format!("❌ {url}: {generic}")
    } else {
        format!("❌ {url}: {generic}: {error}")
    }
}
