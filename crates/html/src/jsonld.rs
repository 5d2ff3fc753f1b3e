//! # Structured Data
//!
//! Reads `application/ld+json` blocks. Publishers routinely ship blocks that
//! are not valid JSON, so each block is parsed as-is first and, failing that,
//! run through a lenient repair pass before a second attempt. Blocks that still
//! fail are skipped.

use crate::dom::select_doc;
use regex::Regex;
use scraper::Html;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("html comment regex"));
static CDATA_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?://\s*)?<!\[CDATA\[|(?://\s*)?\]\]>").expect("cdata marker regex")
});

/// Date keys in the order they are trusted.
pub const DATE_KEYS: &[&str] = &[
    "datePublished",
    "dateCreated",
    "dateModified",
    "publishedDate",
    "datePosted",
];

const PUBLISHER_KEYS: &[&str] = &["publisher", "provider", "sourceOrganization"];

/// Parses every structured-data block in the document, skipping the ones that
/// cannot be read.
pub fn structured_blocks(doc: &Html) -> Vec<Value> {
    select_doc(doc, "script[type*=\"ld+json\"]")
        .into_iter()
        .filter_map(|script| parse_structured_data(&script.text().collect::<String>()))
        .collect()
}

/// Parses one block, repairing it if needed.
pub fn parse_structured_data(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(raw) {
        return Some(value);
    }

    let repaired = repair_json(raw);
    if !is_balanced(&repaired) {
        debug!("Skipping structured data block: unbalanced after repair");
        return None;
    }
    match serde_json::from_str(&repaired) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Skipping structured data block: {e}");
            None
        }
    }
}

/// Rewrites common JSON mistakes into valid JSON.
///
/// Handles HTML comments and CDATA markers, single-quoted strings, unquoted
/// object keys, and trailing commas. Text inside double-quoted strings is never
/// touched.
pub fn repair_json(raw: &str) -> String {
    let stripped = HTML_COMMENT.replace_all(raw, "");
    let stripped = CDATA_MARKER.replace_all(&stripped, "");
    normalize_syntax(stripped.trim())
}

fn normalize_syntax(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => i = copy_double_quoted(&chars, i, &mut out),
            '\'' => i = convert_single_quoted(&chars, i, &mut out),
            ',' => {
                let next = next_significant(&chars, i + 1);
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(',');
                }
                i += 1;
            }
            c if is_key_start(c) => {
                let start = i;
                while i < chars.len() && is_key_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let is_key = next_significant(&chars, i) == Some(':')
                    && matches!(out.trim_end().chars().last(), Some('{') | Some(','));
                if is_key {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(&word);
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Copies a double-quoted string verbatim. Returns the index after it.
fn copy_double_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        i += 1;
        match c {
            '\\' if i < chars.len() => {
                out.push(chars[i]);
                i += 1;
            }
            '"' => return i,
            _ => {}
        }
    }
    i
}

/// Emits a single-quoted string as a double-quoted one. Returns the index after it.
fn convert_single_quoted(chars: &[char], start: usize, out: &mut String) -> usize {
    out.push('"');
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' if chars.get(i + 1) == Some(&'\'') => {
                out.push('\'');
                i += 2;
            }
            '\\' if i + 1 < chars.len() => {
                out.push('\\');
                out.push(chars[i + 1]);
                i += 2;
            }
            '"' => {
                out.push_str("\\\"");
                i += 1;
            }
            '\'' => {
                out.push('"');
                return i + 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out.push('"');
    i
}

fn next_significant(chars: &[char], from: usize) -> Option<char> {
    chars[from.min(chars.len())..]
        .iter()
        .copied()
        .find(|c| !c.is_whitespace())
}

fn is_key_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '$' | '@')
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '@')
}

/// Checks that the text is one `{...}` or `[...]` value with matching brackets.
fn is_balanced(text: &str) -> bool {
    let text = text.trim();
    let wrapped = (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'));
    if !wrapped {
        return false;
    }

    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return false;
                }
                // The opening bracket must close only at the very end.
                if stack.is_empty() && index + c.len_utf8() != text.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty() && !in_string
}

// --- Schema readers ---

/// The author name(s) from the first `author` entry that yields any.
///
/// Arrays of authors are joined with `", "`.
pub fn find_author(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .find_map(|block| find_by_keys(block, &["author"], &read_people))
}

/// The publisher name, preferring `publisher` over `provider` over
/// `sourceOrganization` within each object.
pub fn find_publisher(blocks: &[Value]) -> Option<String> {
    blocks
        .iter()
        .find_map(|block| find_by_keys(block, PUBLISHER_KEYS, &read_name))
}

/// Raw date strings for every date key, in trust order, for the caller to
/// validate.
pub fn find_dates(blocks: &[Value]) -> Vec<String> {
    DATE_KEYS
        .iter()
        .flat_map(|key| {
            blocks
                .iter()
                .filter_map(move |block| find_by_keys(block, &[*key], &read_string))
        })
        .collect()
}

/// Depth-first search for the first key in `keys` whose value `read` accepts.
/// Keys on an object are checked before its children.
fn find_by_keys(
    value: &Value,
    keys: &[&str],
    read: &dyn Fn(&Value) -> Option<String>,
) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(|item| find_by_keys(item, keys, read)),
        Value::Object(map) => keys
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(read)
            .or_else(|| map.values().find_map(|child| find_by_keys(child, keys, read))),
        _ => None,
    }
}

fn read_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A string or `{ "name": ... }`; for arrays, the first readable entry.
fn read_name(value: &Value) -> Option<String> {
    match value {
        Value::String(_) => read_string(value),
        Value::Object(map) => map.get("name").and_then(read_string),
        Value::Array(items) => items.iter().find_map(read_name),
        _ => None,
    }
}

/// Like [`read_name`], but arrays contribute every distinct name.
fn read_people(value: &Value) -> Option<String> {
    let Value::Array(items) = value else {
        return read_name(value);
    };
    let mut names: Vec<String> = Vec::new();
    for name in items.iter().filter_map(read_name) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    (!names.is_empty()).then(|| names.join(", "))
}
