use clipper::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<HtmlError> for ExtractError {
    fn from(err: HtmlError) -> Self {
        match err {
            HtmlError::Status { status, .. } => ExtractError::Status { status },
            other => ExtractError::Fetch(other.to_string()),
        }
    }
}
