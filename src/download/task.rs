//! Download tasks derived from records

use crate::state::Record;
use std::path::{Path, PathBuf};
use url::Url;

/// Extension used when the document URL does not carry a usable one
const DEFAULT_EXTENSION: &str = "pdf";

/// Turns a case identifier into a filesystem-safe stem
///
/// `/` becomes `_` and `.` becomes `~`, so `12/Pdt.G/2018/PA.Sby` is stored as
/// `12_Pdt~G_2018_PA~Sby`. The mapping is reversible for identifiers that do
/// not already contain `_` or `~`.
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| match c {
            '/' => '_',
            '.' => '~',
            other => other,
        })
        .collect()
}

/// Parses a document URL, accepting only absolute http(s) URLs
pub fn parse_document_url(url: &str) -> Option<Url> {
    Url::parse(url.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// File extension taken from the last path segment of the document URL
pub fn document_extension(url: Option<&Url>) -> String {
    url.and_then(|u| u.path_segments()?.last().map(str::to_string))
        .and_then(|segment| {
            let (_, ext) = segment.rsplit_once('.')?;
            let valid = !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric());
            valid.then(|| ext.to_ascii_lowercase())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// One document to fetch into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Identifier as it appears on the detail page, kept for reporting
    pub identifier: String,

    /// `<sanitized identifier>.<ext>`
    pub file_name: String,

    /// Document URL, `None` when the record has no usable one
    pub url: Option<Url>,

    /// Final path of the document in the archive
    pub target: PathBuf,
}

impl DownloadTask {
    /// Builds the task for `record`, or `None` when it has no identifier
    pub fn from_record(
        record: &Record,
        identifier_field: &str,
        archive_dir: &Path,
    ) -> Option<Self> {
        let identifier = record.field(identifier_field).as_text()?.trim();
        if identifier.is_empty() {
            return None;
        }

        let url = record.document_url.as_text().and_then(parse_document_url);
        let file_name = format!(
            "{}.{}",
            sanitize_identifier(identifier),
            document_extension(url.as_ref())
        );

        Some(Self {
            identifier: identifier.to_string(),
            target: archive_dir.join(&file_name),
            file_name,
            url,
        })
    }

    pub fn has_valid_url(&self) -> bool {
        self.url.is_some()
    }

    /// The archive already holds this document
    pub fn is_done(&self) -> bool {
        self.target.is_file()
    }
}
