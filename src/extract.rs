use scraper::{ElementRef, Html, Selector};

use crate::error::DocsError;

pub const DEFAULT_MARKER: &str = "header";

/// Pulls the content region out of a documentation page: everything after
/// the first header marker, at the marker's own nesting level.
pub struct Extractor {
    marker: Selector,
}

impl Extractor {
    pub fn new(marker: &str) -> Result<Self, DocsError> {
        let marker = Selector::parse(marker).map_err(|e| DocsError::Marker {
            selector: marker.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { marker })
    }

    /// Serialized HTML of every element sibling following the first marker,
    /// or `None` when the page has no marker.
    ///
    /// Text nodes between siblings are dropped; nested content of each
    /// sibling is kept as-is.
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let marker = document.select(&self.marker).next()?;

        let fragment = marker
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .map(|el| el.html())
            .collect::<String>();
        Some(fragment)
    }
}
