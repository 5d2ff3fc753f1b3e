//! # Field Extractors
//!
//! Each field is recovered by a cascade: a fixed, ordered list of strategies
//! tried from most to least trustworthy, where the first accepted candidate
//! wins. Every candidate a strategy offers is recorded as an
//! [`ExtractionAttempt`], accepted or not, so a result can always be traced
//! back to the strategy that produced it.

pub mod author;
pub mod content;
pub mod date;
pub mod publication;
pub mod sites;

use crate::dom;
use crate::jsonld;
use scraper::{ElementRef, Html};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

pub use author::extract_author;
pub use content::extract_content;
pub use date::extract_date;
pub use publication::extract_publication;
pub use sites::{SiteOverride, SiteRegistry};

/// The metadata field an attempt was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Publication,
    Author,
    Date,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Publication => "publication",
            Field::Author => "author",
            Field::Date => "date",
            Field::Content => "content",
        };
        f.write_str(name)
    }
}

/// One candidate offered by one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionAttempt {
    pub field: Field,
    pub strategy: &'static str,
    pub candidate: String,
    pub accepted: bool,
}

/// A parsed document plus everything the extractors share: the page URL, the
/// narrowed search scope, the decoded structured data and the raw text used to
/// validate authors. Built once per page.
pub struct Page<'a> {
    pub doc: &'a Html,
    pub host: Option<String>,
    /// The main content region, when one was recognized.
    pub main: Option<ElementRef<'a>>,
    /// The main content region, or the whole document.
    pub scope: ElementRef<'a>,
    pub structured: Vec<Value>,
    pub raw_text: String,
}

impl<'a> Page<'a> {
    pub fn new(doc: &'a Html, url: &str) -> Self {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase));
        let main = dom::main_content(doc);
        Self {
            doc,
            host,
            main,
            scope: main.unwrap_or_else(|| doc.root_element()),
            structured: jsonld::structured_blocks(doc),
            raw_text: dom::raw_text(doc),
        }
    }
}

/// A named strategy producing candidates for a field, in preference order.
pub(crate) type Strategy<'s> = (&'static str, &'s dyn Fn(&Page<'_>) -> Vec<String>);

/// Runs `strategies` in order and returns the first candidate `accept` turns
/// into a value. Strategies after the winning one are never evaluated.
pub(crate) fn run_cascade(
    page: &Page<'_>,
    field: Field,
    strategies: &[Strategy<'_>],
    accept: &dyn Fn(&str) -> Option<String>,
    attempts: &mut Vec<ExtractionAttempt>,
) -> Option<String> {
    for (name, strategy) in strategies {
        for candidate in strategy(page) {
            let accepted = accept(&candidate);
            record(attempts, field, *name, candidate, accepted.is_some());
            if accepted.is_some() {
                return accepted;
            }
        }
    }
    None
}

pub(crate) fn record(
    attempts: &mut Vec<ExtractionAttempt>,
    field: Field,
    strategy: &'static str,
    candidate: String,
    accepted: bool,
) {
    debug!(%field, strategy, candidate = %candidate, accepted, "extraction attempt");
    attempts.push(ExtractionAttempt {
        field,
        strategy,
        candidate,
        accepted,
    });
}

/// Texts of the elements matching `css` within `scope`, skipping empty ones.
pub(crate) fn texts(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    dom::select(scope, css)
        .into_iter()
        .map(dom::text_of)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Pushes `value` unless an equal value is already present.
pub(crate) fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}
