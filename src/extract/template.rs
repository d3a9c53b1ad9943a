//! CSS-selector site template
//!
//! Listing pages are read with two selectors: one for detail links and one
//! for the next-page indicator. Detail pages are laid out as label/value
//! table rows, so each field is the text of the cell that follows the cell
//! whose text equals the field's label.

use crate::config::{FieldEntry, TemplateConfig};
use crate::extract::{resolve_link, DetailExtractor, ListingExtractor};
use crate::state::{FieldValue, Record, RecordContext};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selector-driven extractor for one directory site layout
#[derive(Debug)]
pub struct SiteTemplate {
    link_selector: Selector,
    next_page_selector: Selector,
    label_cell_selector: Selector,
    anchor_selector: Selector,
    document_link_suffix: String,
    fields: Vec<FieldEntry>,
}

impl SiteTemplate {
    /// Compiles the template's selectors
    ///
    /// # Returns
    ///
    /// * `Ok(SiteTemplate)` - All selectors parsed
    /// * `Err(HarvestError::Template)` - A selector is malformed
    pub fn from_config(config: &TemplateConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            link_selector: parse_selector(&config.link_selector)?,
            next_page_selector: parse_selector(&config.next_page_selector)?,
            label_cell_selector: parse_selector(&config.label_cell_selector)?,
            anchor_selector: parse_selector("a[href]")?,
            document_link_suffix: config.document_link_suffix.clone(),
            fields: config.fields.clone(),
        })
    }

    fn document_link(&self, document: &Html, page_url: Option<&Url>) -> Option<String> {
        let href = document
            .select(&self.anchor_selector)
            .find(|anchor| element_text(anchor).ends_with(&self.document_link_suffix))
            .and_then(|anchor| anchor.value().attr("href"))?;

        match page_url {
            Some(base) => resolve_link(href, base),
            None => Some(href.trim().to_string()).filter(|h| !h.is_empty()),
        }
    }
}

impl ListingExtractor for SiteTemplate {
    fn extract_links(&self, body: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(body);

        document
            .select(&self.link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, base_url))
            .collect()
    }

    fn has_next_page(&self, body: &str) -> bool {
        let document = Html::parse_document(body);
        document.select(&self.next_page_selector).next().is_some()
    }
}

impl DetailExtractor for SiteTemplate {
    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    fn extract_record(&self, body: &str, context: &RecordContext<'_>) -> Record {
        let document = Html::parse_document(body);
        let cells: Vec<ElementRef<'_>> = document.select(&self.label_cell_selector).collect();

        let mut record = Record::new(context);
        for field in &self.fields {
            let value = cells
                .iter()
                .position(|cell| element_text(cell) == field.label)
                .and_then(|index| cells.get(index + 1))
                .map(element_text);
            record
                .fields
                .push((field.name.clone(), FieldValue::from_option(value)));
        }

        let page_url = Url::parse(context.url).ok();
        record.document_url =
            FieldValue::from_option(self.document_link(&document, page_url.as_ref()));

        record
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Template(format!("'{}': {:?}", selector, e)))
}

/// Trimmed text content of an element
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
