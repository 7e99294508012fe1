//! Page-level types.

use super::LayoutElement;
use serde::{Deserialize, Serialize};

/// A single page of extracted layout.
///
/// Dimensions are page-local: PDF points for PDF input, device pixels for
/// raster and HTML input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Page number (1-indexed)
    pub page_no: u32,

    /// Page width
    pub width: f32,

    /// Page height
    pub height: f32,

    /// Elements on the page, in detection order
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Create an empty page with the given dimensions.
    pub fn new(page_no: u32, width: f32, height: f32) -> Self {
        Self {
            page_no,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Add an element to the page.
    pub fn add_element(&mut self, element: LayoutElement) {
        self.elements.push(element);
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by id.
    pub fn get_element(&self, id: u32) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Plain text of all text-bearing elements, one per line.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| e.text_content.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
