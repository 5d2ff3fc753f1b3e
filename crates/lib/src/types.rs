//! # Shared Data Model
//!
//! Source-agnostic types shared by the extraction engine, the record-store
//! adapters and the batch processor.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The four fields recovered from an article page.
///
/// Every field is a plain string. A field that could not be recovered is the
/// empty string, never a placeholder. `date` is either empty or `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub publication: String,
    pub author: String,
    pub date: String,
    pub content: String,
}

impl ArticleMetadata {
    /// Returns `true` when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.publication.is_empty()
            && self.author.is_empty()
            && self.date.is_empty()
            && self.content.is_empty()
    }
}

/// The kind of a destination field, as declared by the record store's schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Title,
    RichText,
    Select,
    MultiSelect,
    Date,
    Url,
    Number,
    Checkbox,
    Email,
    PhoneNumber,
    /// Any kind outside the supported set, kept by name so it can be reported.
    Other(String),
}

impl FieldKind {
    /// Maps a store type name (e.g. `"rich_text"`) onto a `FieldKind`.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "title" => Self::Title,
            "rich_text" => Self::RichText,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "date" => Self::Date,
            "url" => Self::Url,
            "number" => Self::Number,
            "checkbox" => Self::Checkbox,
            "email" => Self::Email,
            "phone_number" => Self::PhoneNumber,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Date => "date",
            Self::Url => "url",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection schema: field name to field kind, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: BTreeMap<String, FieldKind>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any field with the same name.
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: FieldKind) {
        self.fields.insert(name.into(), kind);
    }

    pub fn kind(&self, name: &str) -> Option<&FieldKind> {
        self.fields.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldKind)> for Schema {
    fn from_iter<T: IntoIterator<Item = (String, FieldKind)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// The readable value of a row field.
///
/// Only the kinds a URL can live in are modelled; everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValue {
    Url(Option<String>),
    RichText(String),
    Title(String),
    Other,
}

impl RowValue {
    /// The plain text carried by the value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RowValue::Url(url) => url.as_deref(),
            RowValue::RichText(text) | RowValue::Title(text) => Some(text.as_str()),
            RowValue::Other => None,
        }
    }
}

/// A record in a collection, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub values: HashMap<String, RowValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, field: impl Into<String>, value: RowValue) -> Self {
        self.values.insert(field.into(), value);
        self
    }

    /// Reads an `http`-prefixed URL out of the given field.
    ///
    /// URL, rich-text and title fields are supported. Returns `None` when the field
    /// is missing, empty or does not hold something that looks like a web URL.
    pub fn url_in(&self, field: &str) -> Option<String> {
        let text = self.values.get(field)?.as_text()?.trim();
        if text.starts_with("http") {
            Some(text.to_string())
        } else {
            None
        }
    }
}
