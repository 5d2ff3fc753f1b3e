use thiserror::Error;

/// A generic error type for metadata sources.
///
/// Each source is responsible for mapping its specific errors (e.g., a network
/// timeout or an unreadable body) into these standardized variants, so the batch
/// processor can report failures uniformly.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to fetch page: {0}")]
    Fetch(String),

    #[error("Page returned HTTP status {status}")]
    Status { status: u16 },
}

/// A generic error type for record-store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to reach the record store: {0}")]
    Request(String),

    #[error("Record store returned an error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode record store response: {0}")]
    Decode(String),

    #[error("Record store is misconfigured: {0}")]
    Config(String),
}

/// Errors that abort a whole enrichment run before any row is processed.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Failed to read the collection schema: {0}")]
    Schema(#[source] StoreError),

    #[error("Failed to query the collection rows: {0}")]
    Query(#[source] StoreError),

    #[error("Invalid enrichment options: {0}")]
    InvalidOptions(String),
}
