//! Per-site author extraction for publishers whose markup defeats the generic
//! cascade. Overrides are consulted first; what they return still has to pass
//! the author validator.

use super::{push_unique, Page};
use crate::dom::{self, select_doc, text_of};

/// A hostname predicate paired with an author extractor.
#[derive(Clone, Copy)]
pub struct SiteOverride {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub author: fn(&Page<'_>) -> Option<String>,
}

impl SiteOverride {
    pub fn new(
        name: &'static str,
        matches: fn(&str) -> bool,
        author: fn(&Page<'_>) -> Option<String>,
    ) -> Self {
        Self {
            name,
            matches,
            author,
        }
    }
}

impl std::fmt::Debug for SiteOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteOverride").field("name", &self.name).finish()
    }
}

/// Ordered set of site overrides. The default registry knows AP News and The
/// New York Times.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    overrides: Vec<SiteOverride>,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(SiteOverride::new("apnews", is_ap_news, ap_news_author));
        registry.register(SiteOverride::new("nytimes", is_nytimes, nytimes_author));
        registry
    }
}

impl SiteRegistry {
    pub fn empty() -> Self {
        Self {
            overrides: Vec::new(),
        }
    }

    /// Adds an override. Earlier registrations are consulted first.
    pub fn register(&mut self, site: SiteOverride) -> &mut Self {
        self.overrides.push(site);
        self
    }

    pub fn matching<'r>(&'r self, host: &'r str) -> impl Iterator<Item = &'r SiteOverride> + 'r {
        self.overrides.iter().filter(move |site| (site.matches)(host))
    }

    /// Author candidates from every override matching the page's host.
    pub fn author_candidates(&self, page: &Page<'_>) -> Vec<String> {
        let Some(host) = page.host.as_deref() else {
            return Vec::new();
        };
        self.matching(host)
            .filter_map(|site| (site.author)(page))
            .collect()
    }
}

/// True for `domain` itself and any of its subdomains.
pub fn host_is(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn is_ap_news(host: &str) -> bool {
    host_is(host, "apnews.com")
}

fn is_nytimes(host: &str) -> bool {
    host_is(host, "nytimes.com")
}

fn ap_news_author(page: &Page<'_>) -> Option<String> {
    let mut names = Vec::new();
    for link in select_doc(page.doc, ".Page-authors a, .Page-authors .Link") {
        push_unique(&mut names, text_of(link));
    }
    if !names.is_empty() {
        return Some(names.join(", "));
    }
    select_doc(page.doc, ".Page-authors, [class*=\"Component-bylines\"]")
        .into_iter()
        .map(text_of)
        .find(|text| !text.is_empty())
}

fn nytimes_author(page: &Page<'_>) -> Option<String> {
    let mut names = Vec::new();
    for el in select_doc(
        page.doc,
        "[itemprop=\"author\"] [itemprop=\"name\"], [data-testid=\"byline\"] .last-byline, .last-byline",
    ) {
        push_unique(&mut names, text_of(el));
    }
    if !names.is_empty() {
        return Some(names.join(", "));
    }
    dom::meta_content(page.doc, &["meta[name=\"byl\"]"])
}
