//! Page extractors
//!
//! The pipeline only depends on the two traits defined here. Markup rules for
//! a particular directory site live behind them; `SiteTemplate` is the
//! CSS-selector implementation driven by the `[template]` configuration.

mod template;

pub use template::SiteTemplate;

use crate::state::{Record, RecordContext};
use url::Url;

/// Reads a listing page
pub trait ListingExtractor: Send + Sync {
    /// Detail page links on the page, absolute, in document order
    fn extract_links(&self, body: &str, base_url: &Url) -> Vec<String>;

    /// Whether another listing page follows this one
    fn has_next_page(&self, body: &str) -> bool;
}

/// Reads a detail page into a record
///
/// Extraction never fails: a value missing from the page becomes
/// `FieldValue::NotFound`.
pub trait DetailExtractor: Send + Sync {
    /// Field names produced by `extract_record`, in column order
    fn field_names(&self) -> Vec<String>;

    fn extract_record(&self, body: &str, context: &RecordContext<'_>) -> Record;
}

/// Resolves a link href to an absolute HTTP(S) URL
///
/// Returns None for empty hrefs, fragments, special schemes and anything
/// that does not resolve to http or https.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
