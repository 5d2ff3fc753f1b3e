//! # `clipper-notion`: Notion Record Store
//!
//! This crate adapts a Notion database to the `RecordStore` trait from the core
//! `clipper` library, so enriched metadata can be written back onto the pages
//! of a database.

use async_trait::async_trait;
use clipper::{FieldKind, RecordStore, Row, RowValue, Schema, StoreError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_BASE_URL: &str = "https://api.notion.com";
const BASE_URL_OVERRIDE_VAR: &str = "NOTION_API_BASE_URL_OVERRIDE_FOR_TESTING";

/// Notion caps both query pages and appended children at 100.
pub const MAX_PAGE_SIZE: usize = 100;

// --- Error Definitions ---

#[derive(Error, Debug, Clone)]
pub enum NotionError {
    #[error("Failed to fetch from Notion API: {0}")]
    Fetch(String),
    #[error("Notion API returned an error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to decode Notion response: {0}")]
    Decode(String),
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NotionError::Decode(err.to_string())
        } else {
            NotionError::Fetch(err.to_string())
        }
    }
}

/// Converts the specific `NotionError` into the store-agnostic `StoreError`.
impl From<NotionError> for StoreError {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::Fetch(msg) => StoreError::Request(msg),
            NotionError::Api { status, body } => StoreError::Api {
                status,
                message: body,
            },
            NotionError::Decode(msg) => StoreError::Decode(msg),
            NotionError::InvalidHeader(msg) => StoreError::Config(msg),
        }
    }
}

// --- Notion API Response Structures ---

#[derive(Deserialize, Debug)]
struct PropertySchema {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize, Debug)]
struct DatabaseResponse {
    properties: HashMap<String, PropertySchema>,
}

#[derive(Deserialize, Debug, Clone)]
struct PlainText {
    plain_text: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PropertyValue {
    Title { title: Vec<PlainText> },
    RichText { rich_text: Vec<PlainText> },
    Url { url: Option<String> },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct Page {
    id: String,
    properties: HashMap<String, PropertyValue>,
}

#[derive(Deserialize, Debug)]
struct QueryResponse {
    results: Vec<Page>,
    next_cursor: Option<String>,
    has_more: bool,
}

#[derive(Deserialize, Debug)]
struct Block {
    id: String,
}

#[derive(Deserialize, Debug)]
struct BlockList {
    results: Vec<Block>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

// --- Client ---

/// A `RecordStore` backed by the Notion REST API.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    headers: HeaderMap,
    base_url: String,
}

impl NotionClient {
    /// Creates a client for the given integration token and API version.
    pub fn new(token: &str, version: &str) -> Result<Self, NotionError> {
        Ok(Self {
            client: Client::new(),
            headers: construct_headers(token, version)?,
            base_url: get_base_url(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NotionError> {
        let response = request.headers(self.headers.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotionError::Api {
                status: status.as_u16(),
                body: api_message(body),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn fetch_schema(&self, database_id: &str) -> Result<Schema, NotionError> {
        let database: DatabaseResponse = self
            .send(self.client.get(self.url(&format!("databases/{database_id}"))))
            .await?;
        Ok(database
            .properties
            .into_iter()
            .map(|(name, property)| (name, FieldKind::from_type_name(&property.kind)))
            .collect())
    }

    async fn query_pages(&self, database_id: &str, limit: usize) -> Result<Vec<Row>, NotionError> {
        let url = self.url(&format!("databases/{database_id}/query"));
        let mut rows = Vec::new();
        let mut next_cursor: Option<String> = None;

        while rows.len() < limit {
            let mut body = json!({ "page_size": (limit - rows.len()).min(MAX_PAGE_SIZE) });
            if let Some(cursor) = &next_cursor {
                body["start_cursor"] = json!(cursor);
            }
            let response: QueryResponse = self.send(self.client.post(&url).json(&body)).await?;
            rows.extend(response.results.into_iter().map(into_row));

            match (response.has_more, response.next_cursor) {
                (true, Some(cursor)) => next_cursor = Some(cursor),
                _ => break,
            }
        }

        rows.truncate(limit);
        Ok(rows)
    }

    async fn patch_page(&self, page_id: &str, properties: Map<String, Value>) -> Result<(), NotionError> {
        let body = json!({ "properties": properties });
        self.send::<IgnoredAny>(self.client.patch(self.url(&format!("pages/{page_id}"))).json(&body))
            .await?;
        Ok(())
    }

    async fn child_block_ids(&self, page_id: &str) -> Result<Vec<String>, NotionError> {
        let url = self.url(&format!("blocks/{page_id}/children"));
        let blocks: BlockList = self
            .send(self.client.get(url).query(&[("page_size", MAX_PAGE_SIZE)]))
            .await?;
        Ok(blocks.results.into_iter().map(|block| block.id).collect())
    }

    async fn append_paragraphs(&self, page_id: &str, paragraphs: &[String]) -> Result<(), NotionError> {
        let url = self.url(&format!("blocks/{page_id}/children"));
        for chunk in paragraphs.chunks(MAX_PAGE_SIZE) {
            let children: Vec<Value> = chunk.iter().map(|text| paragraph_block(text)).collect();
            self.send::<IgnoredAny>(self.client.patch(&url).json(&json!({ "children": children })))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn retrieve_schema(&self, collection_id: &str) -> Result<Schema, StoreError> {
        let schema = self.fetch_schema(collection_id).await?;
        info!(
            "Retrieved schema for Notion database {collection_id} ({} properties)",
            schema.len()
        );
        Ok(schema)
    }

    async fn query_rows(&self, collection_id: &str, limit: usize) -> Result<Vec<Row>, StoreError> {
        let rows = self.query_pages(collection_id, limit).await?;
        info!("Fetched {} pages from Notion database {collection_id}", rows.len());
        Ok(rows)
    }

    async fn update_row(&self, row_id: &str, properties: Map<String, Value>) -> Result<(), StoreError> {
        debug!("Updating Notion page {row_id} ({} properties)", properties.len());
        Ok(self.patch_page(row_id, properties).await?)
    }

    async fn list_blocks(&self, row_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.child_block_ids(row_id).await?)
    }

    async fn append_blocks(&self, row_id: &str, paragraphs: &[String]) -> Result<(), StoreError> {
        debug!("Appending {} blocks to Notion page {row_id}", paragraphs.len());
        Ok(self.append_paragraphs(row_id, paragraphs).await?)
    }
}

// --- Helper Functions ---

fn get_base_url() -> String {
    env::var(BASE_URL_OVERRIDE_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn construct_headers(token: &str, version: &str) -> Result<HeaderMap, NotionError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| NotionError::InvalidHeader(format!("Invalid token: {e}")))?,
    );
    headers.insert(
        "Notion-Version",
        HeaderValue::from_str(version)
            .map_err(|e| NotionError::InvalidHeader(format!("Invalid version: {e}")))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Notion error bodies carry a human-readable `message`; fall back to the raw body.
fn api_message(body: String) -> String {
    serde_json::from_str::<ApiErrorBody>(&body)
        .map(|error| error.message)
        .unwrap_or(body)
}

fn join_plain_text(parts: &[PlainText]) -> String {
    parts.iter().map(|t| t.plain_text.as_str()).collect()
}

fn into_row(page: Page) -> Row {
    let values = page
        .properties
        .into_iter()
        .map(|(name, property)| {
            let value = match property {
                PropertyValue::Title { title } => RowValue::Title(join_plain_text(&title)),
                PropertyValue::RichText { rich_text } => {
                    RowValue::RichText(join_plain_text(&rich_text))
                }
                PropertyValue::Url { url } => RowValue::Url(url),
                PropertyValue::Other => RowValue::Other,
            };
            (name, value)
        })
        .collect();
    Row { id: page.id, values }
}

fn paragraph_block(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [{ "type": "text", "text": { "content": text } }]
        }
    })
}
