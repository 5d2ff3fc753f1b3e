//! Cross-checks candidate author strings against the raw page text.
//!
//! The validator only accepts or rejects; it never rewrites a candidate.

use regex::Regex;
use std::sync::LazyLock;

static NAME_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,\s*|\s+and\s+").expect("name separator regex"));

const MIN_CANDIDATE_CHARS: usize = 4;
const SIGNIFICANT_TOKEN_CHARS: usize = 4;
const SHORT_PART_CHARS: usize = 3;

/// Returns `true` when `candidate` looks like a real byline for this page.
///
/// Single-word and very short candidates are rejected outright. Otherwise the
/// candidate is split into names on commas and `" and "`, and it passes when at
/// least half of those names can be found in `page_text`.
pub fn is_valid_author(candidate: &str, page_text: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.chars().count() < MIN_CANDIDATE_CHARS || !candidate.contains(char::is_whitespace)
    {
        return false;
    }

    let names: Vec<&str> = NAME_SEPARATOR
        .split(candidate)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return false;
    }

    let haystack = page_text.to_lowercase();
    let found = names
        .iter()
        .filter(|name| name_appears(name, page_text, &haystack))
        .count();
    found * 2 >= names.len()
}

fn name_appears(name: &str, page_text: &str, haystack: &str) -> bool {
    let parts: Vec<&str> = name.split_whitespace().collect();

    // Short two-part names ("Al Li") are too ambiguous for token matching.
    if parts.len() == 2 && parts.iter().all(|p| p.chars().count() <= SHORT_PART_CHARS) {
        let pattern = format!(
            r"(?i){}\s+{}",
            regex::escape(parts[0]),
            regex::escape(parts[1])
        );
        return Regex::new(&pattern).is_ok_and(|re| re.is_match(page_text));
    }

    let tokens: Vec<String> = parts
        .iter()
        .map(|p| p.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| t.chars().count() >= SIGNIFICANT_TOKEN_CHARS)
        .collect();
    if tokens.is_empty() {
        return haystack.contains(&name.to_lowercase());
    }
    let present = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    present * 2 >= tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "City budget passes. By Jane Doe and Al Li. Reporting by MARIA GONZALEZ-RUIZ.";

    #[test]
    fn test_rejects_single_word_and_short() {
        assert!(!is_valid_author("Staff", "Staff reporters"));
        assert!(!is_valid_author("Reuters", "Reuters"));
        assert!(!is_valid_author("J D", "J D"));
    }

    #[test]
    fn test_rejects_names_absent_from_page() {
        assert!(!is_valid_author("Ghost Writer", PAGE));
    }

    #[test]
    fn test_accepts_names_present_in_page() {
        assert!(is_valid_author("Jane Doe", PAGE));
        assert!(is_valid_author("jane doe", PAGE));
        assert!(is_valid_author("Maria Gonzalez-Ruiz", PAGE));
    }

    #[test]
    fn test_short_names_need_literal_match() {
        assert!(is_valid_author("Al Li", PAGE));
        assert!(is_valid_author("al   li", "by AL\nLI"));
        assert!(!is_valid_author("Li Al", PAGE));
    }

    #[test]
    fn test_multi_author_needs_half() {
        assert!(is_valid_author("Jane Doe, Ghost Writer", PAGE));
        assert!(is_valid_author("Jane Doe and Al Li", PAGE));
        assert!(!is_valid_author("Ghost Writer, Phantom Author, Jane Doe", PAGE));
    }
}
