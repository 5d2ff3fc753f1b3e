//! HTTP fetching for article pages.

use crate::errors::HtmlError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::info;

/// A desktop browser user agent; many publishers serve stripped pages to
/// unknown clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for the page fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            max_redirects: 5,
        }
    }
}

pub fn build_client(config: &FetchConfig) -> Result<Client, HtmlError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout)
        .redirect(redirect::Policy::limited(config.max_redirects))
        .build()
        .map_err(HtmlError::Client)
}

/// Downloads a page body. Non-success statuses are errors.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, HtmlError> {
    info!("Fetching article page: {url}");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HtmlError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}
