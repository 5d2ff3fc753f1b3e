//! Author extraction.

use super::{push_unique, record, run_cascade, texts, ExtractionAttempt, Field, Page, SiteRegistry};
use crate::dom::{self, collapse_whitespace};
use crate::jsonld;
use crate::validator::is_valid_author;
use regex::Regex;
use std::sync::LazyLock;

static BYLINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:written\s+by|posted\s+by|by(?:line)?\b|author\(s\)|authors?\b)\s*:?\s*")
        .expect("byline prefix regex")
});
static AND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+and\s+|\s*&\s*").expect("and separator regex"));
static SPACE_BEFORE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+,").expect("comma spacing regex"));
static BYLINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let name = r"\p{Lu}[\p{L}'’\-]+\s+\p{Lu}[\p{L}'’\-]+";
    Regex::new(&format!(
        r"(?:\b[Ww]ritten [Bb]y|\b[Bb]y|\b[Ww]riter|\b[Aa]uthor)\s*:?\s+({name}(?:\s*(?:,|\band\b)\s*{name})*)"
    ))
    .expect("byline pattern regex")
});

const MULTI_AUTHOR_SELECTORS: &[&str] = &[
    ".authors a",
    ".article-authors a",
    ".byline__authors a",
    ".author-list a",
    ".contributors a",
    "[class*=\"authors\"] a",
];

const BYLINE_SELECTORS: &[&str] = &[
    ".byline",
    ".byline__name",
    ".author-name",
    ".author",
    ".article-author",
    ".post-author",
    ".entry-author",
    "[class*=\"byline\"]",
    "[class*=\"author\"]",
];

const AUTHOR_META: &[&str] = &[
    "meta[name=\"author\"]",
    "meta[property=\"article:author\"]",
    "meta[name=\"article:author\"]",
    "meta[name=\"byl\"]",
    "meta[name=\"parsely-author\"]",
    "meta[name=\"sailthru.author\"]",
    "meta[name=\"dc.creator\"]",
    "meta[name=\"DC.creator\"]",
];

/// Maximum byline elements considered per page.
const MAX_BYLINE_CANDIDATES: usize = 10;

/// Recovers the author(s) of the article, or `""` when no candidate survives
/// validation against the page text.
pub fn extract_author(
    page: &Page<'_>,
    sites: &SiteRegistry,
    attempts: &mut Vec<ExtractionAttempt>,
) -> String {
    let site_overrides = |page: &Page<'_>| sites.author_candidates(page);
    let strategies: [super::Strategy<'_>; 7] = [
        ("site override", &site_overrides),
        ("multi-author container", &multi_author_containers),
        ("structured data", &|page: &Page<'_>| {
            jsonld::find_author(&page.structured)
                .into_iter()
                .collect::<Vec<_>>()
        }),
        ("author markup", &author_markup),
        ("byline element", &byline_elements),
        ("byline text", &byline_text),
        ("meta tag", &|page: &Page<'_>| {
            dom::meta_contents(page.doc, AUTHOR_META)
                .into_iter()
                .filter(|value| !value.starts_with("http"))
                .collect::<Vec<_>>()
        }),
    ];
    let accept = |candidate: &str| {
        let cleaned = clean_byline(candidate);
        is_valid_author(&cleaned, &page.raw_text).then_some(cleaned)
    };

    match run_cascade(page, Field::Author, &strategies, &accept, attempts) {
        Some(author) => author,
        None => {
            record(attempts, Field::Author, "none", String::new(), false);
            String::new()
        }
    }
}

/// Strips byline prefixes and normalizes `and`/`&` separators to commas.
pub fn clean_byline(raw: &str) -> String {
    let text = collapse_whitespace(raw);
    let text = BYLINE_PREFIX.replace(&text, "");
    let text = AND_SEPARATOR.replace_all(&text, ", ");
    let text = SPACE_BEFORE_COMMA.replace_all(&text, ",");
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '|' | '-' | ':' | '·'))
        .to_string()
}

fn multi_author_containers(page: &Page<'_>) -> Vec<String> {
    MULTI_AUTHOR_SELECTORS
        .iter()
        .filter_map(|css| {
            let mut names = Vec::new();
            for name in texts(page.scope, css) {
                push_unique(&mut names, name);
            }
            (!names.is_empty()).then(|| names.join(", "))
        })
        .collect()
}

/// `rel="author"` and `itemprop="author"` elements, joined when there are
/// several, followed by the first one alone.
fn author_markup(page: &Page<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for el in dom::select(page.scope, "[rel=\"author\"], [itemprop=\"author\"]") {
        let name = dom::select(el, "[itemprop=\"name\"]")
            .into_iter()
            .next()
            .map(|inner| {
                inner
                    .value()
                    .attr("content")
                    .map(collapse_whitespace)
                    .unwrap_or_else(|| dom::text_of(inner))
            })
            .or_else(|| el.value().attr("content").map(collapse_whitespace))
            .unwrap_or_else(|| dom::text_of(el));
        push_unique(&mut names, name);
    }

    let mut candidates = Vec::new();
    if names.len() > 1 {
        candidates.push(names.join(", "));
    }
    candidates.extend(names.into_iter().next());
    candidates
}

fn byline_elements(page: &Page<'_>) -> Vec<String> {
    let mut candidates = Vec::new();
    for css in BYLINE_SELECTORS {
        for text in texts(page.scope, css) {
            push_unique(&mut candidates, text);
        }
    }
    candidates.truncate(MAX_BYLINE_CANDIDATES);
    candidates
}

fn byline_text(page: &Page<'_>) -> Vec<String> {
    let text = dom::text_of(page.scope);
    BYLINE_PATTERN
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .take(MAX_BYLINE_CANDIDATES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn author_of(html: &str, url: &str) -> (String, Vec<ExtractionAttempt>) {
        let doc = Html::parse_document(html);
        let page = Page::new(&doc, url);
        let mut attempts = Vec::new();
        let author = extract_author(&page, &SiteRegistry::default(), &mut attempts);
        (author, attempts)
    }

    #[test]
    fn test_clean_byline() {
        assert_eq!(clean_byline("By Jane Doe"), "Jane Doe");
        assert_eq!(clean_byline("BYLINE: Jane Doe and John Smith"), "Jane Doe, John Smith");
        assert_eq!(clean_byline("Author(s): Jane Doe & John Smith"), "Jane Doe, John Smith");
        assert_eq!(clean_byline("Written by   Jane Doe ,"), "Jane Doe");
        assert_eq!(clean_byline("Byron Smith"), "Byron Smith");
    }

    #[test]
    fn test_no_byline_markup_yields_empty() {
        let (author, attempts) = author_of(
            "<html><body><article><p>The council met on Tuesday.</p></article></body></html>",
            "https://news.example/a",
        );
        assert_eq!(author, "");
        assert_eq!(attempts.last().map(|a| a.strategy), Some("none"));
    }

    #[test]
    fn test_structured_data_author() {
        let (author, attempts) = author_of(
            r#"<html><head><script type="application/ld+json">
                {"@type": "NewsArticle", "author": {"@type": "Person", "name": "Jane Doe"}}
            </script></head><body><article><p>Story</p></article></body></html>"#,
            "https://news.example/a",
        );
        assert_eq!(author, "Jane Doe");
        assert_eq!(attempts.last().unwrap().strategy, "structured data");
    }

    #[test]
    fn test_multi_author_container_wins_over_meta() {
        let (author, _) = author_of(
            r#"<html><head><meta name="author" content="Desk Staff"></head><body><article>
                <div class="article-authors"><a href="/a">Jane Doe</a>, <a href="/b">John Smith</a></div>
                <p>Story</p></article></body></html>"#,
            "https://news.example/a",
        );
        assert_eq!(author, "Jane Doe, John Smith");
    }

    #[test]
    fn test_byline_element_prefix_stripped() {
        let (author, attempts) = author_of(
            r#"<html><body><article><p class="byline">By Jane Doe and John Smith</p>
                <p>Story</p></article></body></html>"#,
            "https://news.example/a",
        );
        assert_eq!(author, "Jane Doe, John Smith");
        assert_eq!(attempts.last().unwrap().strategy, "byline element");
    }

    #[test]
    fn test_rejected_candidates_fall_through() {
        // The structured-data author never appears in the page and is discarded.
        let (author, attempts) = author_of(
            r#"<html><head>
                <script type="application/ld+json">{"author": "Staff"}</script>
                <meta name="author" content="Jane Doe">
            </head><body><article><p>Reporting by Jane Doe.</p></article></body></html>"#,
            "https://news.example/a",
        );
        assert_eq!(author, "Jane Doe");
        assert!(attempts
            .iter()
            .any(|a| a.strategy == "structured data" && !a.accepted));
    }

    #[test]
    fn test_byline_pattern_in_text() {
        let (author, attempts) = author_of(
            "<html><body><article><p>Written by: Maria Lopez, Tom Baker for the desk.</p></article></body></html>",
            "https://news.example/a",
        );
        assert_eq!(author, "Maria Lopez, Tom Baker");
        assert_eq!(attempts.last().unwrap().strategy, "byline text");
    }

    #[test]
    fn test_itemprop_author_name() {
        let (author, _) = author_of(
            r#"<html><body><article>
                <span itemprop="author" itemscope><span itemprop="name">Jane Doe</span></span>
                <p>Story</p></article></body></html>"#,
            "https://news.example/a",
        );
        assert_eq!(author, "Jane Doe");
    }

    #[test]
    fn test_site_override_runs_first() {
        let (author, attempts) = author_of(
            r#"<html><head><script type="application/ld+json">{"author": "John Smith"}</script></head>
               <body><div class="Page-authors">By <a class="Link">Jane Doe</a></div>
               <main><p>John Smith contributed.</p></main></body></html>"#,
            "https://apnews.com/article/x",
        );
        assert_eq!(author, "Jane Doe");
        assert_eq!(attempts[0].strategy, "site override");
    }
}
