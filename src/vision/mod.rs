//! Vision layout engine for scans and raster images.
//!
//! Text lines come from a [`TextLineDetector`]; categories from a replaceable
//! [`CategoryPolicy`]; styles, optionally, from a [`StyleInference`] client
//! shown a Set-of-Mark overlay of the detected lines.

mod category;
mod ocr;

use std::collections::HashMap;
use std::path::Path;

use image::DynamicImage;

pub use category::{infer_category, CategoryPolicy};
#[cfg(feature = "ocr")]
pub use ocr::TesseractDetector;
pub use ocr::{OcrLine, TextLineDetector};

use crate::error::{Error, Result};
use crate::model::{BBox, LayoutElement, LayoutStyle};
use crate::options::LayoutOptions;
use crate::render::{draw_som_overlay, write_debug_artifacts};
use crate::vlm::StyleInference;

type DetectorLoader = Box<dyn FnMut() -> Result<Box<dyn TextLineDetector>>>;

/// Detects layout elements in raster images.
///
/// The detector is built on first use and cached for the engine's lifetime.
/// An engine is not meant to be shared across threads; run one per worker.
pub struct VisionEngine {
    detector: Option<Box<dyn TextLineDetector>>,
    loader: DetectorLoader,
    category_policy: CategoryPolicy,
}

impl VisionEngine {
    /// Create an engine backed by Tesseract.
    ///
    /// Fails with [`Error::MissingCapability`] when the crate was built
    /// without the `ocr` feature.
    #[cfg(feature = "ocr")]
    pub fn new(options: &LayoutOptions) -> Result<Self> {
        let language = options.ocr_language.clone();
        Ok(Self::with_loader(move || {
            log::info!("Loading Tesseract models ({})", language);
            let detector = TesseractDetector::new(&language)?;
            log::info!("Tesseract models loaded");
            Ok(Box::new(detector) as Box<dyn TextLineDetector>)
        }))
    }

    /// Create an engine backed by Tesseract.
    ///
    /// Fails with [`Error::MissingCapability`] when the crate was built
    /// without the `ocr` feature.
    #[cfg(not(feature = "ocr"))]
    pub fn new(_options: &LayoutOptions) -> Result<Self> {
        Err(Error::MissingCapability {
            engine: "vision",
            reason: "built without the `ocr` feature; rebuild with --features ocr \
                     or supply a TextLineDetector"
                .to_string(),
        })
    }

    /// Create an engine around an already constructed detector.
    pub fn with_detector<D: TextLineDetector + 'static>(detector: D) -> Self {
        Self {
            detector: Some(Box::new(detector)),
            loader: Box::new(|| {
                Err(Error::Other("detector already provided".to_string()))
            }),
            category_policy: infer_category,
        }
    }

    /// Create an engine whose detector is built by `loader` on first use.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn TextLineDetector>> + 'static,
    {
        Self {
            detector: None,
            loader: Box::new(loader),
            category_policy: infer_category,
        }
    }

    /// Replace the category policy.
    pub fn with_category_policy(mut self, policy: CategoryPolicy) -> Self {
        self.category_policy = policy;
        self
    }

    /// Whether the detector has been constructed.
    pub fn is_loaded(&self) -> bool {
        self.detector.is_some()
    }

    fn detector(&mut self) -> Result<&mut dyn TextLineDetector> {
        if self.detector.is_none() {
            self.detector = Some((self.loader)()?);
        }
        match self.detector.as_deref_mut() {
            Some(detector) => Ok(detector),
            None => Err(Error::Ocr("detector unavailable".to_string())),
        }
    }

    /// Open an image file and detect its elements.
    pub fn detect_path(
        &mut self,
        path: &Path,
        style_client: Option<&dyn StyleInference>,
        debug_dir: Option<&Path>,
    ) -> Result<Vec<LayoutElement>> {
        let image = image::open(path)?;
        self.detect(&image, path, style_client, debug_dir)
    }

    /// Detect elements in `image`.
    ///
    /// `source` names the debug artifacts. Style inference failures are
    /// logged and leave elements unstyled.
    pub fn detect(
        &mut self,
        image: &DynamicImage,
        source: &Path,
        style_client: Option<&dyn StyleInference>,
        debug_dir: Option<&Path>,
    ) -> Result<Vec<LayoutElement>> {
        let size = (image.width(), image.height());
        log::info!(
            "Processing image: {} ({}x{})",
            source.display(),
            size.0,
            size.1
        );

        let detector = self.detector()?;
        log::info!("Running {} text detection", detector.name());
        let lines = detector.detect_lines(image)?;
        log::info!("OCR detected {} text lines", lines.len());

        let elements = self.lines_to_elements(lines, size);

        if let Some(dir) = debug_dir {
            if let Err(e) = write_debug_artifacts(dir, source, image, &elements) {
                log::warn!("Failed to write debug artifacts: {}", e);
            }
        }

        let mut elements = elements;
        if let Some(client) = style_client {
            if !elements.is_empty() {
                apply_styles(image, &mut elements, client);
            }
        }

        Ok(elements)
    }

    fn lines_to_elements(&self, lines: Vec<OcrLine>, size: (u32, u32)) -> Vec<LayoutElement> {
        let mut elements = Vec::with_capacity(lines.len());
        for (index, line) in lines.into_iter().enumerate() {
            let Some(coords) = line.bbox else {
                log::warn!("Skipping text line {} without a bounding box", index + 1);
                continue;
            };
            let Some(bbox) = BBox::new(coords[0], coords[1], coords[2], coords[3]) else {
                log::warn!(
                    "Skipping text line {} with degenerate box {:?}",
                    index + 1,
                    coords
                );
                continue;
            };

            let text = Some(line.text.trim().to_string()).filter(|t| !t.is_empty());
            let category = (self.category_policy)(text.as_deref(), &bbox, size);
            let mut element = LayoutElement::new(elements.len() as u32 + 1, category, bbox)
                .with_confidence(line.confidence.unwrap_or(1.0));
            element.text_content = text;
            elements.push(element);
        }
        elements
    }
}

/// Run style inference over a Set-of-Mark overlay and merge results by id.
fn apply_styles(image: &DynamicImage, elements: &mut [LayoutElement], client: &dyn StyleInference) {
    log::info!("Extracting styles for {} elements via VLM", elements.len());
    let marks: Vec<(u32, BBox)> = elements.iter().map(|e| (e.id, e.bbox)).collect();
    let overlay = DynamicImage::ImageRgb8(draw_som_overlay(image, &marks));
    let ids: Vec<u32> = marks.iter().map(|(id, _)| *id).collect();

    let mut styles: HashMap<u32, LayoutStyle> = match client.extract_styles(&overlay, &ids) {
        Ok(styles) => styles,
        Err(e) => {
            log::error!("VLM style extraction failed: {}", e);
            return;
        }
    };

    let mut applied = 0;
    for element in elements.iter_mut() {
        if let Some(style) = styles.remove(&element.id) {
            element.style = Some(style);
            applied += 1;
        }
    }
    for id in styles.keys() {
        log::warn!("Style returned for unknown element id {}", id);
    }
    log::debug!("Applied styles to {} elements", applied);
}
