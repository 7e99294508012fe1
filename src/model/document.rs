//! Document-level types.

use super::LayoutPage;
use serde::{Deserialize, Serialize};

/// How a document's layout was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    /// Text and images read from a PDF's content streams
    DigitalPdf,
    /// Scanned PDF or raster image processed by OCR
    ScannedImage,
    /// HTML rendered in a headless browser
    HtmlRender,
    /// File type not handled; no elements extracted
    SkippedUnsupported,
}

impl OriginType {
    /// The serialized label.
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginType::DigitalPdf => "digital_pdf",
            OriginType::ScannedImage => "scanned_image",
            OriginType::HtmlRender => "html_render",
            OriginType::SkippedUnsupported => "skipped_unsupported",
        }
    }
}

impl std::fmt::Display for OriginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetadata {
    /// Source file name (without directories)
    pub filename: String,

    /// Number of pages (at least 1)
    pub page_count: u32,

    /// How the layout was produced
    pub origin_type: OriginType,

    /// Caller-supplied correlation id
    #[serde(default)]
    pub extraction_id: Option<String>,
}

impl LayoutMetadata {
    /// Create metadata for a file.
    pub fn new(filename: impl Into<String>, origin_type: OriginType) -> Self {
        Self {
            filename: filename.into(),
            page_count: 1,
            origin_type,
            extraction_id: None,
        }
    }
}

/// The extracted layout of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Document metadata
    pub metadata: LayoutMetadata,

    /// Pages in document order
    pub pages: Vec<LayoutPage>,
}

impl LayoutDocument {
    /// Create a document, deriving `page_count` from the pages.
    pub fn new(mut metadata: LayoutMetadata, pages: Vec<LayoutPage>) -> Self {
        metadata.page_count = (pages.len() as u32).max(1);
        Self { metadata, pages }
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_no: u32) -> Option<&LayoutPage> {
        if page_no == 0 {
            return None;
        }
        self.pages.get((page_no - 1) as usize)
    }

    /// Iterate over all elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &super::LayoutElement> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    /// Total number of elements across pages.
    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    /// Whether no elements were extracted.
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Category, LayoutElement};

    #[test]
    fn test_origin_labels() {
        assert_eq!(
            serde_json::to_string(&OriginType::SkippedUnsupported).unwrap(),
            "\"skipped_unsupported\""
        );
        assert_eq!(OriginType::DigitalPdf.to_string(), "digital_pdf");
    }

    #[test]
    fn test_page_count_derived() {
        let meta = LayoutMetadata::new("a.pdf", OriginType::DigitalPdf);
        let doc = LayoutDocument::new(meta.clone(), vec![]);
        assert_eq!(doc.metadata.page_count, 1);

        let pages = vec![LayoutPage::new(1, 10.0, 10.0), LayoutPage::new(2, 10.0, 10.0)];
        let doc = LayoutDocument::new(meta, pages);
        assert_eq!(doc.metadata.page_count, 2);
        assert!(doc.get_page(0).is_none());
        assert_eq!(doc.get_page(2).map(|p| p.page_no), Some(2));
    }

    #[test]
    fn test_elements_in_order() {
        let bbox = BBox::new(0.0, 0.0, 5.0, 5.0).unwrap();
        let mut p1 = LayoutPage::new(1, 10.0, 10.0);
        p1.add_element(LayoutElement::new(1, Category::Title, bbox));
        let mut p2 = LayoutPage::new(2, 10.0, 10.0);
        p2.add_element(LayoutElement::new(2, Category::Text, bbox));
        let doc = LayoutDocument::new(
            LayoutMetadata::new("a.pdf", OriginType::DigitalPdf),
            vec![p1, p2],
        );
        let ids: Vec<u32> = doc.elements().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(doc.element_count(), 2);
    }
}
