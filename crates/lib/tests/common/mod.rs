#![allow(dead_code)]
//! # Common Test Utilities
//!
//! In-memory implementations of `RecordStore` and `MetadataSource` so the batch
//! processor can be tested without a network.

use async_trait::async_trait;
use clipper::{ArticleMetadata, ExtractError, MetadataSource, RecordStore, Row, Schema, StoreError};
use dotenvy::dotenv;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};
use tokio::time::Instant;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// --- Mock Record Store ---

#[derive(Clone, Default)]
pub struct MockRecordStore {
    pub schema: Schema,
    pub rows: Vec<Row>,
    pub existing_blocks: HashMap<String, usize>,
    pub failing_updates: HashSet<String>,
    pub fail_schema: bool,
    pub updates: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    pub appended: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    pub queried_limits: Arc<Mutex<Vec<usize>>>,
}

impl MockRecordStore {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows,
            ..Default::default()
        }
    }

    pub fn updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_for(&self, row_id: &str) -> Option<Map<String, Value>> {
        self.updates()
            .into_iter()
            .find(|(id, _)| id == row_id)
            .map(|(_, props)| props)
    }

    pub fn appended(&self) -> Vec<(String, Vec<String>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn retrieve_schema(&self, _collection_id: &str) -> Result<Schema, StoreError> {
        if self.fail_schema {
            return Err(StoreError::Api {
                status: 404,
                message: "Could not find database".into(),
            });
        }
        Ok(self.schema.clone())
    }

    async fn query_rows(&self, _collection_id: &str, limit: usize) -> Result<Vec<Row>, StoreError> {
        self.queried_limits.lock().unwrap().push(limit);
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    async fn update_row(
        &self,
        row_id: &str,
        properties: Map<String, Value>,
    ) -> Result<(), StoreError> {
        if self.failing_updates.contains(row_id) {
            return Err(StoreError::Api {
                status: 400,
                message: "body failed validation".into(),
            });
        }
        self.updates
            .lock()
            .unwrap()
            .push((row_id.to_string(), properties));
        Ok(())
    }

    async fn list_blocks(&self, row_id: &str) -> Result<Vec<String>, StoreError> {
        let count = self.existing_blocks.get(row_id).copied().unwrap_or(0);
        Ok((0..count).map(|i| format!("{row_id}-block-{i}")).collect())
    }

    async fn append_blocks(&self, row_id: &str, paragraphs: &[String]) -> Result<(), StoreError> {
        self.appended
            .lock()
            .unwrap()
            .push((row_id.to_string(), paragraphs.to_vec()));
        Ok(())
    }
}

// --- Mock Metadata Source ---

#[derive(Clone, Default)]
pub struct MockMetadataSource {
    pub pages: HashMap<String, ArticleMetadata>,
    pub failing_urls: HashSet<String>,
    pub calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl MockMetadataSource {
    pub fn with_page(mut self, url: &str, metadata: ArticleMetadata) -> Self {
        self.pages.insert(url.to_string(), metadata);
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for MockMetadataSource {
    async fn extract(&self, url: &str) -> Result<ArticleMetadata, ExtractError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        if self.failing_urls.contains(url) {
            return Err(ExtractError::Fetch("connection reset by peer".into()));
        }
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

/// A sample article used across tests.
pub fn sample_metadata() -> ArticleMetadata {
    ArticleMetadata {
        publication: "The Daily Planet".into(),
        author: "Lois Lane and Clark Kent".into(),
        date: "2021-01-05".into(),
        content: "Metropolis council approved the budget. The vote was close.".into(),
    }
}
