//! # Article Metadata Enrichment
//!
//! This crate provides the store-agnostic core of `clipper`: the shared data model,
//! the traits that metadata sources and record stores implement, and the batch
//! processor that fills a collection's rows with metadata extracted from the URL
//! each row points at.

pub mod enrich;
pub mod errors;
pub mod traits;
pub mod types;

pub use enrich::{run_enrichment, EnrichOptions, EnrichReport, FieldOverrides};
pub use errors::{EnrichError, ExtractError, StoreError};
pub use traits::{MetadataSource, RecordStore};
pub use types::{ArticleMetadata, FieldKind, Row, RowValue, Schema};
