//! # clipper-html: Article Metadata Extraction
//!
//! Recovers the publication, author(s), publish date and body text of a news
//! article from its HTML. The page is parsed once and handed to four
//! independent field extractors, each a cascade of strategies ordered from
//! structured signals down to text heuristics. [`ArticleExtractor`] adds
//! fetching on top and implements [`clipper::MetadataSource`].

pub mod date;
pub mod dom;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod jsonld;
pub mod validator;

use async_trait::async_trait;
use clipper::{ArticleMetadata, ExtractError, MetadataSource};
use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

pub use date::{is_valid_plausible_date, parse_loose_date};
pub use errors::HtmlError;
pub use extract::{ExtractionAttempt, Field, Page, SiteOverride, SiteRegistry};
pub use fetch::FetchConfig;
pub use validator::is_valid_author;

/// Extracted metadata together with every candidate considered on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub metadata: ArticleMetadata,
    pub attempts: Vec<ExtractionAttempt>,
}

/// Fetches article pages and extracts their metadata.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    client: Client,
    sites: SiteRegistry,
}

impl ArticleExtractor {
    /// An extractor with the default fetch settings and site overrides.
    pub fn new() -> Result<Self, HtmlError> {
        Self::with_config(&FetchConfig::default())
    }

    pub fn with_config(config: &FetchConfig) -> Result<Self, HtmlError> {
        Ok(Self {
            client: fetch::build_client(config)?,
            sites: SiteRegistry::default(),
        })
    }

    pub fn with_sites(mut self, sites: SiteRegistry) -> Self {
        self.sites = sites;
        self
    }

    pub fn sites_mut(&mut self) -> &mut SiteRegistry {
        &mut self.sites
    }

    /// Fetches `url` and extracts its metadata. Only the fetch can fail.
    pub async fn extract_url(&self, url: &str) -> Result<Extraction, HtmlError> {
        Url::parse(url).map_err(|e| HtmlError::InvalidUrl(format!("{url}: {e}")))?;
        let html = fetch::fetch_page(&self.client, url).await?;
        let extraction = self.extract_html(&html, url);
        info!(
            "Extracted metadata from {url} ({} candidates considered)",
            extraction.attempts.len()
        );
        Ok(extraction)
    }

    /// Runs every field extractor over one parsed copy of `html`. `url` is
    /// used for host-based decisions only.
    pub fn extract_html(&self, html: &str, url: &str) -> Extraction {
        let doc = Html::parse_document(html);
        let page = Page::new(&doc, url);
        let mut attempts = Vec::new();

        let metadata = ArticleMetadata {
            publication: extract::extract_publication(&page, &mut attempts),
            author: extract::extract_author(&page, &self.sites, &mut attempts),
            date: extract::extract_date(&page, &mut attempts),
            content: extract::extract_content(&page, &mut attempts),
        };
        debug!(?metadata, "extraction finished for {url}");
        Extraction { metadata, attempts }
    }
}

#[async_trait]
impl MetadataSource for ArticleExtractor {
    async fn extract(&self, url: &str) -> Result<ArticleMetadata, ExtractError> {
        Ok(self.extract_url(url).await?.metadata)
    }
}
