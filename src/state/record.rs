//! Sources and extracted records

use std::fmt;

/// Text written in place of a value the page did not contain
pub const NOT_FOUND: &str = "N/A";

static MISSING: FieldValue = FieldValue::NotFound;

/// Checkpoint columns that are not detail fields
pub const RESERVED_COLUMNS: [&str; 5] =
    ["source_url", "category", "year", "source", "document_url"];

/// One listing to crawl (a court, for the default site)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub category: String,
    pub year: u16,
    pub directory: String,
}

/// An extracted value, or the typed marker for a value that was missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    NotFound,
}

impl FieldValue {
    /// Parses a stored cell, mapping the sentinel (or nothing) to `NotFound`
    pub fn from_cell(cell: &str) -> Self {
        if cell == NOT_FOUND || cell.is_empty() {
            Self::NotFound
        } else {
            Self::Text(cell.to_string())
        }
    }

    /// Wraps an optional value, treating blank text as missing
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => Self::Text(text),
            _ => Self::NotFound,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::NotFound => f.write_str(NOT_FOUND),
        }
    }
}

/// Parameters the detail extractor stamps onto every record
#[derive(Debug, Clone)]
pub struct RecordContext<'a> {
    pub source: &'a Source,
    pub url: &'a str,
}

/// One decision extracted from a detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Detail page the record was extracted from
    pub source_url: String,

    /// Named fields in template order
    pub fields: Vec<(String, FieldValue)>,

    /// Source identifier
    pub source: String,

    pub category: String,

    pub year: u16,

    /// Attached document, if the page linked one
    pub document_url: FieldValue,
}

impl Record {
    /// Creates an empty record stamped with the context's source and URL
    pub fn new(context: &RecordContext<'_>) -> Self {
        Self {
            source_url: context.url.to_string(),
            fields: Vec::new(),
            source: context.source.id.clone(),
            category: context.source.category.clone(),
            year: context.source.year,
            document_url: FieldValue::NotFound,
        }
    }

    /// Looks up a field by name; unknown names read as `NotFound`
    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
            .unwrap_or(&MISSING)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}
