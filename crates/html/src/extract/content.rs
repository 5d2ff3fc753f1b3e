//! Body content extraction.

use super::{record, texts, ExtractionAttempt, Field, Page};
use crate::dom;

/// A description at least this long is used as the content directly.
pub const MIN_DESCRIPTION_CHARS: usize = 100;
const MAX_PARAGRAPHS: usize = 10;

const DESCRIPTION_META: &[&str] = &[
    "meta[name=\"description\"]",
    "meta[property=\"og:description\"]",
    "meta[name=\"twitter:description\"]",
];

/// The page description, or the opening paragraphs of the main content when
/// the description is short or missing. May be empty.
pub fn extract_content(page: &Page<'_>, attempts: &mut Vec<ExtractionAttempt>) -> String {
    let description = dom::meta_content(page.doc, DESCRIPTION_META).unwrap_or_default();
    let long_enough = description.chars().count() >= MIN_DESCRIPTION_CHARS;
    if !description.is_empty() {
        record(attempts, Field::Content, "description", description.clone(), long_enough);
    }
    if long_enough {
        return description;
    }

    if let Some(main) = page.main {
        let paragraphs: Vec<String> = texts(main, "p").into_iter().take(MAX_PARAGRAPHS).collect();
        let body = if paragraphs.is_empty() {
            dom::text_of(main)
        } else {
            paragraphs.join(" ")
        };
        if !body.is_empty() {
            record(attempts, Field::Content, "main content", body.clone(), true);
            return body;
        }
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn content_of(html: &str) -> String {
        let doc = Html::parse_document(html);
        let page = Page::new(&doc, "https://news.example/a");
        extract_content(&page, &mut Vec::new())
    }

    #[test]
    fn test_long_description_wins() {
        let description = "d".repeat(MIN_DESCRIPTION_CHARS);
        let html = format!(
            r#"<head><meta name="description" content="{description}"></head><body><article><p>Body</p></article></body>"#
        );
        assert_eq!(content_of(&html), description);
    }

    #[test]
    fn test_short_description_falls_back_to_paragraphs() {
        let paragraphs: String = (1..=12).map(|i| format!("<p>Para {i}.</p><p> </p>")).collect();
        let html = format!(
            r#"<head><meta property="og:description" content="Short."></head><body><article>{paragraphs}</article></body>"#
        );
        let content = content_of(&html);
        assert!(content.starts_with("Para 1. Para 2."));
        assert!(content.ends_with("Para 10."));
    }

    #[test]
    fn test_container_text_without_paragraphs() {
        assert_eq!(
            content_of("<body><main><div>Plain <b>text</b> body</div></main></body>"),
            "Plain text body"
        );
    }

    #[test]
    fn test_short_description_kept_without_main_content() {
        assert_eq!(
            content_of(r#"<head><meta name="description" content="Short."></head><body><div>x</div></body>"#),
            "Short."
        );
        assert_eq!(content_of("<body><div>x</div></body>"), "");
    }
}
