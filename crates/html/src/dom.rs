//! Small helpers over `scraper` shared by the extractors.

use scraper::{ElementRef, Html, Selector};

/// Candidate containers for the article body, most specific first.
const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"article\"]",
    "[itemprop=\"articleBody\"]",
    ".article-body",
    ".article__body",
    ".story-body",
    "#article-body",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content-body",
    ".main-content",
    "#content",
    ".content",
    "main",
    "[role=\"main\"]",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Selects the descendants of `scope` matching `css`, in document order.
///
/// An invalid selector selects nothing.
pub fn select<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Selects across the whole document.
pub fn select_doc<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => doc.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// The visible text of an element with whitespace collapsed.
///
/// Text inside `script`, `style` and similar elements is skipped.
pub fn text_of(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    collapse_whitespace(&out)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first non-empty `content` attribute among the given meta selectors,
/// tried in order.
pub fn meta_content(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        select_doc(doc, css)
            .into_iter()
            .filter_map(|meta| meta.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty())
    })
}

/// Every non-empty `content` attribute among the given meta selectors, in
/// selector order.
pub fn meta_contents(doc: &Html, selectors: &[&str]) -> Vec<String> {
    selectors
        .iter()
        .flat_map(|css| select_doc(doc, css))
        .filter_map(|meta| meta.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|content| !content.is_empty())
        .collect()
}

/// The element most likely to hold the article body, if any matches.
pub fn main_content(doc: &Html) -> Option<ElementRef<'_>> {
    MAIN_CONTENT_SELECTORS
        .iter()
        .find_map(|css| select_doc(doc, css).into_iter().next())
}

/// The raw text of the whole document, scripts included.
pub fn raw_text(doc: &Html) -> String {
    collapse_whitespace(&doc.root_element().text().collect::<String>())
}

/// The parent element, skipping the document node.
pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}
