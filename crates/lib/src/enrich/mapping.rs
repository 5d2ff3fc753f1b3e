//! # Destination Field Mapping
//!
//! Resolves which destination field each metadata value goes to, and shapes
//! values into payloads that respect the destination kind's constraints.

use crate::enrich::FieldOverrides;
use crate::types::{FieldKind, Schema};
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Maximum length of a rich-text or title payload.
pub const TEXT_LIMIT: usize = 2000;
/// Maximum length of a select or multi-select option name.
pub const OPTION_NAME_LIMIT: usize = 100;
/// Maximum length of a generated summary.
pub const SUMMARY_LIMIT: usize = 150;
const ELLIPSIS: &str = "...";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("unsupported field type '{0}'")]
    Unsupported(String),
    #[error("value is not valid for a {kind} field")]
    InvalidValue { kind: String },
}

/// The logical fields the batch processor reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetField {
    Url,
    Publication,
    Author,
    Date,
    Summary,
}

impl TargetField {
    pub const ALL: [TargetField; 5] = [
        TargetField::Url,
        TargetField::Publication,
        TargetField::Author,
        TargetField::Date,
        TargetField::Summary,
    ];

    /// Field names tried when the caller did not declare one, most likely first.
    pub fn default_candidates(self) -> &'static [&'static str] {
        match self {
            TargetField::Url => &["URL", "Link", "Url", "Article URL", "Source URL"],
            TargetField::Publication => &["Publication", "Publisher", "Source", "Outlet"],
            TargetField::Author => &["Author", "Authors", "Byline", "Writer"],
            TargetField::Date => &["Date", "Published", "Publication Date", "Date Published"],
            TargetField::Summary => &["Summary", "Description", "Excerpt"],
        }
    }

    fn declared(self, overrides: &FieldOverrides) -> Option<&str> {
        let declared = match self {
            TargetField::Url => &overrides.url,
            TargetField::Publication => &overrides.publication,
            TargetField::Author => &overrides.author,
            TargetField::Date => &overrides.date,
            TargetField::Summary => &overrides.summary,
        };
        declared.as_deref().filter(|name| !name.trim().is_empty())
    }
}

/// The destination field name chosen for each logical field.
///
/// Computed once per batch with [`FieldMapping::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub url: String,
    pub publication: String,
    pub author: String,
    pub date: String,
    pub summary: String,
}

impl FieldMapping {
    /// Resolves every logical field against the schema.
    ///
    /// A declared name is looked up on its own: exact, then case-insensitive, then
    /// substring in either direction, and finally used verbatim. Without a declared
    /// name the default candidates go through the same tiers. Each tier is applied
    /// to all fields before the next one, and a schema field claimed by one logical
    /// field is not offered to the others by the fuzzy tiers.
    pub fn resolve(schema: &Schema, overrides: &FieldOverrides) -> Self {
        let candidates: Vec<Vec<&str>> = TargetField::ALL
            .iter()
            .map(|target| match target.declared(overrides) {
                Some(name) => vec![name],
                None => target.default_candidates().to_vec(),
            })
            .collect();

        let mut resolved: Vec<Option<String>> = vec![None; TargetField::ALL.len()];
        let mut claimed: HashSet<String> = HashSet::new();

        for tier in [MatchTier::Exact, MatchTier::CaseInsensitive, MatchTier::Substring] {
            for (slot, names) in resolved.iter_mut().zip(&candidates) {
                if slot.is_some() {
                    continue;
                }
                if let Some(found) = names
                    .iter()
                    .find_map(|name| tier.find(schema, name, &claimed))
                {
                    claimed.insert(found.clone());
                    *slot = Some(found);
                }
            }
        }

        let mut names = resolved
            .into_iter()
            .zip(&candidates)
            .map(|(slot, names)| slot.unwrap_or_else(|| names[0].to_string()));

        // `ALL` has five entries, so the iterator yields exactly five names.
        Self {
            url: names.next().unwrap_or_default(),
            publication: names.next().unwrap_or_default(),
            author: names.next().unwrap_or_default(),
            date: names.next().unwrap_or_default(),
            summary: names.next().unwrap_or_default(),
        }
    }

    pub fn get(&self, target: TargetField) -> &str {
        match target {
            TargetField::Url => &self.url,
            TargetField::Publication => &self.publication,
            TargetField::Author => &self.author,
            TargetField::Date => &self.date,
            TargetField::Summary => &self.summary,
        }
    }
}

#[derive(Clone, Copy)]
enum MatchTier {
    Exact,
    CaseInsensitive,
    Substring,
}

impl MatchTier {
    fn find(self, schema: &Schema, wanted: &str, claimed: &HashSet<String>) -> Option<String> {
        let wanted_lower = wanted.to_lowercase();
        match self {
            MatchTier::Exact => schema.kind(wanted).map(|_| wanted.to_string()),
            MatchTier::CaseInsensitive => schema
                .names()
                .filter(|name| !claimed.contains(*name))
                .find(|name| name.to_lowercase() == wanted_lower)
                .map(str::to_string),
            MatchTier::Substring => schema
                .names()
                .filter(|name| !claimed.contains(*name) && !name.is_empty())
                .find(|name| {
                    let name_lower = name.to_lowercase();
                    name_lower.contains(&wanted_lower) || wanted_lower.contains(&name_lower)
                })
                .map(str::to_string),
        }
    }
}

/// Shapes a metadata value into the payload for a field of the given kind.
///
/// Text is truncated to the kind's limit. For multi-select fields the author
/// value is split into one option per author.
pub fn build_property(
    kind: &FieldKind,
    target: TargetField,
    value: &str,
) -> Result<Value, MappingError> {
    let value = value.trim();
    let payload = match kind {
        FieldKind::Title => json!({ "title": [{ "text": { "content": truncate(value, TEXT_LIMIT) } }] }),
        FieldKind::RichText => {
            json!({ "rich_text": [{ "text": { "content": truncate(value, TEXT_LIMIT) } }] })
        }
        FieldKind::Select => json!({ "select": { "name": truncate(value, OPTION_NAME_LIMIT) } }),
        FieldKind::MultiSelect => {
            let names = if target == TargetField::Author {
                parse_authors(value)
            } else {
                vec![value.to_string()]
            };
            let options: Vec<Value> = names
                .iter()
                .map(|name| json!({ "name": truncate(name, OPTION_NAME_LIMIT) }))
                .collect();
            json!({ "multi_select": options })
        }
        FieldKind::Date => match chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(_) => json!({ "date": { "start": value } }),
            Err(_) => json!({ "date": null }),
        },
        FieldKind::Url => json!({ "url": value }),
        FieldKind::Number => {
            let number: f64 = value.parse().map_err(|_| MappingError::InvalidValue {
                kind: kind.to_string(),
            })?;
            json!({ "number": number })
        }
        FieldKind::Checkbox => json!({ "checkbox": !value.is_empty() }),
        FieldKind::Email => json!({ "email": value }),
        FieldKind::PhoneNumber => json!({ "phone_number": value }),
        FieldKind::Other(name) => return Err(MappingError::Unsupported(name.clone())),
    };
    Ok(payload)
}

/// Splits an author string into individual names.
///
/// Commas, `" and "` and `" & "` all separate names. Duplicates are dropped and
/// the original order is kept.
pub fn parse_authors(value: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    value
        .split(',')
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split(" & "))
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}

/// Builds a naive summary: the first sentence, or the first 150 characters.
pub fn summarize(content: &str) -> String {
    let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return String::new();
    }

    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            let sentence = &text[..i + c.len_utf8()];
            if sentence.chars().count() <= SUMMARY_LIMIT {
                return sentence.to_string();
            }
            break;
        }
    }

    if text.chars().count() <= SUMMARY_LIMIT {
        return text;
    }
    let cut = truncate(&text, SUMMARY_LIMIT - ELLIPSIS.len());
    format!("{}{ELLIPSIS}", cut.trim_end())
}

/// Splits body content into paragraph blocks that each fit a rich-text payload.
///
/// Splits on word boundaries; a single word longer than the limit is cut.
pub fn content_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in content.split_whitespace() {
        let word = truncate(word, TEXT_LIMIT);
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > TEXT_LIMIT {
            paragraphs.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&word);
        current_len += word_len;
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Truncates to at most `limit` characters.
pub fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
