//! # doclayout
//!
//! Layout extraction for rendered HTML, digital PDFs, scanned PDFs and images.
//!
//! Every input converges on one model: a [`LayoutDocument`] of pages, each
//! holding elements with a category, a bounding box, optional text and an
//! optional visual style.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doclayout::{extract_layout, JsonFormat};
//!
//! fn main() -> doclayout::Result<()> {
//!     let doc = extract_layout("report.pdf")?;
//!     println!("{} elements", doc.element_count());
//!     println!("{}", doc.to_json(JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Engines
//!
//! - **DOM** (`dom` feature): HTML rendered in headless Chrome, geometry and
//!   computed CSS per element
//! - **PDF**: text and image blocks read straight from content streams
//! - **Vision** (`ocr` feature, or any [`TextLineDetector`]): OCR text lines
//!   with heuristic categories and optional model-inferred styles
//!
//! Style inference for scans goes through the [`StyleInference`] trait;
//! [`GeminiClient`] (`vlm` feature) is the bundled implementation.

pub mod detect;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod model;
pub mod options;
pub mod pdf;
pub mod render;
pub mod style;
pub mod vision;
pub mod vlm;

pub use detect::{detect_input_kind, InputKind};
pub use dom::DomEngine;
pub use error::{Error, Result};
pub use extractor::{LayoutExtractor, Route};
pub use model::{
    Alignment, BBox, Category, ColorClass, FontCategory, FontStyle, FontWeight, LayoutDocument,
    LayoutElement, LayoutMetadata, LayoutPage, LayoutStyle, OriginType, Spacing, TextDecoration,
    TextTransform,
};
pub use options::LayoutOptions;
pub use pdf::{PdfDocument, PdfEngine};
pub use render::{draw_som_overlay, JsonFormat};
pub use vision::{infer_category, CategoryPolicy, OcrLine, TextLineDetector, VisionEngine};
#[cfg(feature = "vlm")]
pub use vlm::GeminiClient;
pub use vlm::StyleInference;

use std::path::Path;

/// Extract the layout of a file with default options and no style inference.
///
/// # Example
///
/// ```no_run
/// use doclayout::extract_layout;
///
/// let doc = extract_layout("page.html").unwrap();
/// println!("Origin: {}", doc.metadata.origin_type);
/// ```
pub fn extract_layout<P: AsRef<Path>>(path: P) -> Result<LayoutDocument> {
    LayoutExtractor::new().process(path, None)
}

/// Extract the layout of a file with custom options.
///
/// # Example
///
/// ```no_run
/// use doclayout::{extract_layout_with_options, LayoutOptions};
///
/// let options = LayoutOptions::new()
///     .with_debug_dir("./debug")
///     .with_extraction_id("job-42");
/// let doc = extract_layout_with_options("scan.png", options).unwrap();
/// ```
pub fn extract_layout_with_options<P: AsRef<Path>>(
    path: P,
    options: LayoutOptions,
) -> Result<LayoutDocument> {
    LayoutExtractor::with_options(options).process(path, None)
}

/// Extract the layout of a file and serialize it to JSON.
///
/// # Example
///
/// ```no_run
/// use doclayout::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.layout.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = extract_layout(path)?;
    render::to_json(&doc, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_missing_file() {
        let result = extract_layout("/nonexistent/file.html");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
