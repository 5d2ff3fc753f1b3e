//! Publication name extraction. Unlike the other fields this one always
//! produces a value: the last strategy derives a name from the hostname.

use super::{record, run_cascade, ExtractionAttempt, Field, Page};
use crate::dom::{self, collapse_whitespace};
use crate::jsonld;

pub const UNKNOWN_PUBLICATION: &str = "Unknown Publication";

/// Brand text longer than this is a tagline, not a name.
const MAX_BRAND_CHARS: usize = 50;

const PUBLISHER_META: &[&str] = &[
    "meta[name=\"application-name\"]",
    "meta[name=\"publisher\"]",
    "meta[property=\"article:publisher\"]",
    "meta[name=\"dc.publisher\"]",
    "meta[name=\"DC.publisher\"]",
    "meta[name=\"twitter:site\"]",
];

const BRAND_SELECTORS: &[&str] = &[
    "header .logo img[alt]",
    ".logo img[alt]",
    "[class*=\"logo\"] img[alt]",
    ".site-title",
    ".site-name",
    ".navbar-brand",
    ".brand",
    "header .logo",
    "[class*=\"logo\"]",
];

pub fn extract_publication(page: &Page<'_>, attempts: &mut Vec<ExtractionAttempt>) -> String {
    let site_name = |page: &Page<'_>| {
        dom::meta_contents(page.doc, &["meta[property=\"og:site_name\"]"])
    };
    let structured = |page: &Page<'_>| {
        jsonld::find_publisher(&page.structured)
            .into_iter()
            .collect::<Vec<_>>()
    };
    let strategies: [super::Strategy<'_>; 4] = [
        ("og:site_name", &site_name),
        ("structured data", &structured),
        ("meta tag", &publisher_meta),
        ("brand element", &brand_elements),
    ];
    let accept = |candidate: &str| {
        let name = collapse_whitespace(candidate);
        (!name.is_empty()).then_some(name)
    };

    if let Some(name) = run_cascade(page, Field::Publication, &strategies, &accept, attempts) {
        return name;
    }
    let derived = page
        .host
        .as_deref()
        .and_then(name_from_host)
        .unwrap_or_else(|| UNKNOWN_PUBLICATION.to_string());
    record(attempts, Field::Publication, "hostname", derived.clone(), true);
    derived
}

fn publisher_meta(page: &Page<'_>) -> Vec<String> {
    dom::meta_contents(page.doc, PUBLISHER_META)
        .into_iter()
        .filter(|value| !value.starts_with("http"))
        .map(|value| value.trim_start_matches('@').to_string())
        .collect()
}

fn brand_elements(page: &Page<'_>) -> Vec<String> {
    let root = page.doc.root_element();
    BRAND_SELECTORS
        .iter()
        .flat_map(|css| dom::select(root, css))
        .map(|el| match el.value().attr("alt") {
            Some(alt) if el.value().name() == "img" => collapse_whitespace(alt),
            _ => dom::text_of(el),
        })
        .filter(|text| !text.is_empty() && text.chars().count() < MAX_BRAND_CHARS)
        .collect()
}

/// `www.daily-planet.co.uk` becomes `Daily Planet`.
pub fn name_from_host(host: &str) -> Option<String> {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().filter(|label| !label.is_empty())?;
    let words: Vec<String> = label
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
