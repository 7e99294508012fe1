//! PDF layout engine.

use super::blocks::{build_blocks, PageBlock, TextBlock};
use super::content::{interpret_page, FLAG_BOLD, FLAG_ITALIC};
use super::document::PdfDocument;
use crate::error::Result;
use crate::model::{
    Category, FontStyle, FontWeight, LayoutElement, LayoutPage, LayoutStyle,
};
use crate::style::{
    classify_color, color_int_to_hex, font_category_from_name, strip_subset_prefix,
};

/// Font size (points) above which a text block is a title.
pub const TITLE_SIZE_THRESHOLD: f32 = 14.0;

/// Extracts elements from a digital PDF's content without rendering.
#[derive(Debug, Clone)]
pub struct PdfEngine {
    title_size_threshold: f32,
}

impl Default for PdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfEngine {
    /// Create an engine with the default title threshold.
    pub fn new() -> Self {
        Self {
            title_size_threshold: TITLE_SIZE_THRESHOLD,
        }
    }

    /// Override the title size threshold (exclusive).
    pub fn with_title_threshold(mut self, points: f32) -> Self {
        self.title_size_threshold = points;
        self
    }

    /// Detect elements on a single page (0-indexed), ids starting at 1.
    ///
    /// An out-of-range page yields no elements.
    pub fn detect(&self, pdf: &PdfDocument, page_index: usize) -> Vec<LayoutElement> {
        if page_index >= pdf.page_count() as usize {
            log::warn!(
                "Page {} out of range (PDF has {} pages)",
                page_index,
                pdf.page_count()
            );
            return Vec::new();
        }
        let mut next_id = 1;
        let elements = self.page_elements_or_empty(pdf, page_index, &mut next_id);
        log::debug!(
            "Extracted {} elements from page {}",
            elements.len(),
            page_index + 1
        );
        elements
    }

    /// Detect elements on every page, ids continuing across pages.
    pub fn detect_all_pages(&self, pdf: &PdfDocument) -> Vec<LayoutPage> {
        let mut pages = Vec::with_capacity(pdf.page_count() as usize);
        let mut next_id = 1;

        for index in 0..pdf.page_count() as usize {
            let (width, height) = match pdf.page_geometry(index) {
                Ok(g) => (g.width, g.height),
                Err(e) => {
                    log::warn!("Page {}: {}", index + 1, e);
                    (612.0, 792.0)
                }
            };
            let mut page = LayoutPage::new(index as u32 + 1, width, height);
            page.elements = self.page_elements_or_empty(pdf, index, &mut next_id);
            log::debug!("Page {}: {} elements", index + 1, page.elements.len());
            pages.push(page);
        }

        pages
    }

    fn page_elements_or_empty(
        &self,
        pdf: &PdfDocument,
        index: usize,
        next_id: &mut u32,
    ) -> Vec<LayoutElement> {
        match self.page_elements(pdf, index, next_id) {
            Ok(elements) => elements,
            Err(e) => {
                log::warn!("Failed to extract page {}: {}", index + 1, e);
                Vec::new()
            }
        }
    }

    fn page_elements(
        &self,
        pdf: &PdfDocument,
        index: usize,
        next_id: &mut u32,
    ) -> Result<Vec<LayoutElement>> {
        let geometry = pdf.page_geometry(index)?;
        let content = interpret_page(pdf, index)?;
        let mut elements = Vec::new();

        for block in build_blocks(content, &geometry) {
            let element = match block {
                PageBlock::Image(bbox) => LayoutElement::new(*next_id, Category::Picture, bbox),
                PageBlock::Text(text_block) => match self.text_element(*next_id, &text_block) {
                    Some(element) => element,
                    None => continue,
                },
            };
            elements.push(element);
            *next_id += 1;
        }

        Ok(elements)
    }

    /// Build an element from a text block, styled by its first span.
    fn text_element(&self, id: u32, block: &TextBlock) -> Option<LayoutElement> {
        let text = block.text();
        if text.is_empty() {
            return None;
        }
        let bbox = block.bbox()?;
        let first = &block.first_span()?.span;

        let lower = first.font_name.to_lowercase();
        let is_bold = first.flags & FLAG_BOLD != 0 || lower.contains("bold");
        let is_italic = first.flags & FLAG_ITALIC != 0
            || lower.contains("italic")
            || lower.contains("oblique");
        let color_hex = color_int_to_hex(first.color);

        let style = LayoutStyle {
            font_category: font_category_from_name(&first.font_name),
            typeface_name: Some(strip_subset_prefix(&first.font_name).to_string()),
            font_weight: if is_bold {
                FontWeight::Bold
            } else {
                FontWeight::Normal
            },
            font_style: if is_italic {
                FontStyle::Italic
            } else {
                FontStyle::Normal
            },
            font_size: Some(first.font_size),
            text_color_class: classify_color(Some(&color_hex)),
            text_color_hex: Some(color_hex),
            ..Default::default()
        };

        let category = if first.font_size > self.title_size_threshold {
            Category::Title
        } else {
            Category::Text
        };

        Some(
            LayoutElement::new(id, category, bbox)
                .with_text(text)
                .with_style(style),
        )
    }
}
