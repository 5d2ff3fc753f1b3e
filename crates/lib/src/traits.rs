use crate::errors::{ExtractError, StoreError};
use crate::types::{ArticleMetadata, Row, Schema};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A trait for anything that can turn an article URL into metadata.
///
/// The HTML extraction engine is the production implementation; tests use
/// in-memory mocks.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetches the page at `url` and extracts its metadata.
    ///
    /// A failure to fetch the page is an error. A page that yields no metadata is
    /// not: it returns an `ArticleMetadata` with empty fields.
    async fn extract(&self, url: &str) -> Result<ArticleMetadata, ExtractError>;
}

/// A generic trait that defines the contract for a record-store adapter.
///
/// Any crate that provides a destination for enriched metadata (e.g. Notion)
/// must implement this trait, which lets the batch processor stay independent of
/// the store's wire format.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the collection's field names and kinds.
    async fn retrieve_schema(&self, collection_id: &str) -> Result<Schema, StoreError>;

    /// Returns up to `limit` rows of the collection, in store order.
    async fn query_rows(&self, collection_id: &str, limit: usize)
        -> Result<Vec<Row>, StoreError>;

    /// Writes the given field payloads onto a row.
    ///
    /// Payloads are already shaped for the destination kind, e.g.
    /// `{"select": {"name": "Reuters"}}`.
    async fn update_row(&self, row_id: &str, properties: Map<String, Value>)
        -> Result<(), StoreError>;

    /// Lists the ids of the content blocks currently attached to a row's page.
    async fn list_blocks(&self, row_id: &str) -> Result<Vec<String>, StoreError>;

    /// Appends one paragraph block per entry to a row's page.
    async fn append_blocks(&self, row_id: &str, paragraphs: &[String]) -> Result<(), StoreError>;
}
