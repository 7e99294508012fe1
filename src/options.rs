//! Extraction options and configuration.

use std::path::PathBuf;

/// Default browser viewport, also used as the HTML page size.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1920, 1080);

/// A PDF page with more trimmed characters than this is digital.
pub const DEFAULT_DIGITAL_TEXT_THRESHOLD: usize = 50;

/// Options for layout extraction.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Directory for annotated images and legends (vision path only)
    pub debug_dir: Option<PathBuf>,

    /// Opaque correlation id stamped into the metadata
    pub extraction_id: Option<String>,

    /// Browser window size in pixels
    pub viewport: (u32, u32),

    /// Character count a PDF page must exceed to count as digital
    pub digital_text_threshold: usize,

    /// Chrome/Chromium executable; auto-detected when unset
    pub browser_path: Option<PathBuf>,

    /// Tesseract language code(s), e.g. "eng" or "eng+deu"
    pub ocr_language: String,
}

impl LayoutOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write debug artifacts into `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Set the correlation id.
    pub fn with_extraction_id(mut self, id: impl Into<String>) -> Self {
        self.extraction_id = Some(id.into());
        self
    }

    /// Set the browser viewport.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Set the digital PDF text threshold.
    pub fn with_digital_text_threshold(mut self, chars: usize) -> Self {
        self.digital_text_threshold = chars;
        self
    }

    /// Use a specific browser executable.
    pub fn with_browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.browser_path = Some(path.into());
        self
    }

    /// Set the OCR language.
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr_language = language.into();
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            debug_dir: None,
            extraction_id: None,
            viewport: DEFAULT_VIEWPORT,
            digital_text_threshold: DEFAULT_DIGITAL_TEXT_THRESHOLD,
            browser_path: None,
            ocr_language: "eng".to_string(),
        }
    }
}
