//! Publication date extraction.

use super::{record, run_cascade, ExtractionAttempt, Field, Page};
use crate::date::parse_loose_date;
use crate::dom;
use crate::jsonld;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static TEXT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    let month = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";
    Regex::new(&format!(
        r"(?i)\b{month}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+{month},?\s+\d{{4}}\b|\b\d{{4}}[-/]\d{{1,2}}[-/]\d{{1,2}}\b|\b\d{{1,2}}/\d{{1,2}}/\d{{4}}\b"
    ))
    .expect("text date regex")
});

/// Elements that carry the byline, near which the publish time usually sits.
const BYLINE_SELECTORS: &str = ".byline, .author, [rel=\"author\"], [itemprop=\"author\"], [class*=\"byline\"], [class*=\"author\"]";
const TIME_SELECTORS: &str = "time[datetime], [itemprop=\"datePublished\"][datetime], [itemprop=\"datePublished\"][content]";

/// Publish-date meta tags, most reliable first.
const DATE_META: &[&str] = &[
    "meta[property=\"article:published_time\"]",
    "meta[name=\"article:published_time\"]",
    "meta[itemprop=\"datePublished\"]",
    "meta[name=\"pubdate\"]",
    "meta[name=\"publishdate\"]",
    "meta[name=\"publish-date\"]",
    "meta[name=\"date\"]",
    "meta[name=\"DC.date.issued\"]",
    "meta[name=\"dc.date\"]",
    "meta[name=\"sailthru.date\"]",
    "meta[name=\"parsely-pub-date\"]",
    "meta[property=\"og:published_time\"]",
];

/// Paragraphs scanned for a date written in prose.
const LEADING_PARAGRAPHS: usize = 5;
/// Parent text longer than this is not treated as a label for a `<time>`.
const LABEL_CONTEXT_CHARS: usize = 100;

/// Recovers the publish date as `YYYY-MM-DD`, or `""`.
pub fn extract_date(page: &Page<'_>, attempts: &mut Vec<ExtractionAttempt>) -> String {
    let structured = |page: &Page<'_>| jsonld::find_dates(&page.structured);
    let meta = |page: &Page<'_>| dom::meta_contents(page.doc, DATE_META);
    let strategies: [super::Strategy<'_>; 5] = [
        ("structured data", &structured),
        ("time near byline", &times_near_byline),
        ("time element", &published_times),
        ("meta tag", &meta),
        ("paragraph text", &paragraph_dates),
    ];

    match run_cascade(page, Field::Date, &strategies, &parse_loose_date, attempts) {
        Some(date) => date,
        None => {
            record(attempts, Field::Date, "none", String::new(), false);
            String::new()
        }
    }
}

fn machine_time(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("datetime")
        .or_else(|| el.value().attr("content"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `<time>` values inside each byline element, then its immediate container.
///
/// The container is skipped when it is the extraction scope or the page body,
/// and update markers are ignored.
fn times_near_byline(page: &Page<'_>) -> Vec<String> {
    let mut candidates = Vec::new();
    for byline in dom::select(page.scope, BYLINE_SELECTORS) {
        let container = dom::parent_element(byline).filter(|parent| {
            parent.id() != page.scope.id() && !matches!(parent.value().name(), "body" | "html")
        });
        for near in [Some(byline), container].into_iter().flatten() {
            for el in dom::select(near, TIME_SELECTORS) {
                if is_update_marker(el) {
                    continue;
                }
                if let Some(value) = machine_time(el) {
                    super::push_unique(&mut candidates, value);
                }
            }
        }
    }
    candidates
}

/// Every `<time>` in scope, except those labelled as an update.
fn published_times(page: &Page<'_>) -> Vec<String> {
    dom::select(page.scope, TIME_SELECTORS)
        .into_iter()
        .filter(|el| !is_update_marker(*el))
        .filter_map(machine_time)
        .collect()
}

fn is_update_marker(el: ElementRef<'_>) -> bool {
    let attrs = ["class", "itemprop"]
        .iter()
        .filter_map(|name| el.value().attr(name))
        .collect::<Vec<_>>()
        .join(" ");
    let label = dom::parent_element(el)
        .map(dom::text_of)
        .filter(|text| text.chars().count() <= LABEL_CONTEXT_CHARS)
        .unwrap_or_default();
    let context = format!("{} {} {}", dom::text_of(el), attrs, label).to_lowercase();
    context.contains("updated") || context.contains("modified")
}

fn paragraph_dates(page: &Page<'_>) -> Vec<String> {
    dom::select(page.scope, "p")
        .into_iter()
        .take(LEADING_PARAGRAPHS)
        .flat_map(|p| {
            let text = dom::text_of(p);
            TEXT_DATE
                .find_iter(&text)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn date_of(html: &str) -> (String, Vec<ExtractionAttempt>) {
        let doc = Html::parse_document(html);
        let page = Page::new(&doc, "https://news.example/a");
        let mut attempts = Vec::new();
        let date = extract_date(&page, &mut attempts);
        (date, attempts)
    }

    #[test]
    fn test_structured_date_first() {
        let (date, attempts) = date_of(
            r#"<head><script type="application/ld+json">
                {"dateModified": "2021-02-01T00:00:00Z", "datePublished": "2021-01-05T08:00:00Z"}
               </script><meta property="article:published_time" content="2020-01-01"></head>"#,
        );
        assert_eq!(date, "2021-01-05");
        assert_eq!(attempts.len(), 1);
    }

    #[test]
    fn test_time_near_byline_beats_earlier_time() {
        let (date, attempts) = date_of(
            r#"<body><article>
                <aside><time datetime="2019-06-01">Related</time></aside>
                <div class="meta"><span class="byline">By Jane Doe</span><time datetime="2021-01-05T10:00:00Z">Jan 5</time></div>
                <p>Story</p></article></body>"#,
        );
        assert_eq!(date, "2021-01-05");
        assert_eq!(attempts[0].strategy, "time near byline");
    }

    #[test]
    fn test_byline_in_header_does_not_reach_update_time() {
        let (date, attempts) = date_of(
            r#"<head><meta property="article:published_time" content="2021-01-05T08:00:00Z"></head>
               <body><article>
                <header><div class="byline">By Jane Doe</div></header>
                <p>Story body.</p>
                <p>Updated <time datetime="2021-03-01">March 1</time></p>
               </article></body>"#,
        );
        assert_eq!(date, "2021-01-05");
        assert_eq!(attempts.last().unwrap().strategy, "meta tag");
        assert!(attempts.iter().all(|a| a.candidate != "2021-03-01"));
    }

    #[test]
    fn test_update_time_next_to_byline_is_skipped() {
        let (date, _) = date_of(
            r#"<body><article><div class="meta">
                <span class="byline">By Jane Doe</span>
                <span class="updated">Updated <time datetime="2021-03-01">March 1</time></span>
                <span><time class="published" datetime="2021-01-05">Jan 5</time></span>
               </div><p>Story</p></article></body>"#,
        );
        assert_eq!(date, "2021-01-05");
    }

    #[test]
    fn test_skips_updated_times() {
        let (date, _) = date_of(
            r#"<body><article>
                <p>Updated: <time datetime="2021-03-01">March 1</time></p>
                <span><time class="published" datetime="2021-01-05">Jan 5</time></span>
                </article></body>"#,
        );
        assert_eq!(date, "2021-01-05");
    }

    #[test]
    fn test_meta_then_prose() {
        let (date, _) = date_of(
            r#"<head><meta name="pubdate" content="1970-01-01"><meta name="date" content="2021-01-05"></head>"#,
        );
        assert_eq!(date, "2021-01-05");

        let (date, attempts) = date_of(
            "<body><article><p>Filed March 3rd, 2019 from the capitol.</p></article></body>",
        );
        assert_eq!(date, "2019-03-03");
        assert_eq!(attempts.last().unwrap().strategy, "paragraph text");
    }

    #[test]
    fn test_no_date() {
        let (date, attempts) = date_of("<body><article><p>No dates here.</p></article></body>");
        assert_eq!(date, "");
        assert_eq!(attempts.len(), 1);
    }
}
