//! Routing orchestrator.
//!
//! Classifies an input, dispatches it to the DOM, PDF or vision engine and
//! assembles the resulting [`LayoutDocument`].

use std::path::Path;

use crate::detect::{detect_input_kind, InputKind};
use crate::dom::DomEngine;
use crate::error::{Error, Result};
use crate::model::{BBox, LayoutDocument, LayoutElement, LayoutMetadata, LayoutPage, OriginType};
use crate::options::LayoutOptions;
use crate::pdf::{first_page_raster, PdfDocument, PdfEngine};
use crate::vision::VisionEngine;
use crate::vlm::StyleInference;

/// Engine selected for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// HTML through the DOM engine
    Dom,
    /// PDF with extractable text through the PDF engine
    DigitalPdf,
    /// PDF without enough text; its first page raster goes to the vision engine
    ScannedPdf,
    /// Raster image through the vision engine
    Image,
    /// Recorded as skipped
    Unsupported,
}

impl Route {
    /// Origin type recorded for documents taking this route.
    pub fn origin_type(&self) -> OriginType {
        match self {
            Route::Dom => OriginType::HtmlRender,
            Route::DigitalPdf => OriginType::DigitalPdf,
            Route::ScannedPdf | Route::Image => OriginType::ScannedImage,
            Route::Unsupported => OriginType::SkippedUnsupported,
        }
    }
}

/// Extracts layout from HTML, PDFs and images.
///
/// Processes one document per call. The vision engine is created on the
/// first raster input and reused afterwards, so keep one extractor per
/// worker thread.
pub struct LayoutExtractor {
    options: LayoutOptions,
    pdf_engine: PdfEngine,
    vision: Option<VisionEngine>,
}

impl LayoutExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::with_options(LayoutOptions::default())
    }

    /// Create an extractor with the given options.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            options,
            pdf_engine: PdfEngine::new(),
            vision: None,
        }
    }

    /// Use a preconfigured vision engine instead of the default backend.
    pub fn with_vision_engine(mut self, engine: VisionEngine) -> Self {
        self.vision = Some(engine);
        self
    }

    /// Use a preconfigured PDF engine.
    pub fn with_pdf_engine(mut self, engine: PdfEngine) -> Self {
        self.pdf_engine = engine;
        self
    }

    /// Current options.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Decide which engine handles `path`.
    ///
    /// PDFs are opened to tell digital from scanned: a document is digital
    /// when any page has more trimmed text than the configured threshold.
    pub fn route(&self, path: &Path) -> Result<Route> {
        self.classify(path).map(|(route, _)| route)
    }

    fn classify(&self, path: &Path) -> Result<(Route, Option<PdfDocument>)> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Ok(match detect_input_kind(path) {
            InputKind::Html => (Route::Dom, None),
            InputKind::Image => (Route::Image, None),
            InputKind::Unsupported => (Route::Unsupported, None),
            InputKind::Pdf => {
                let pdf = PdfDocument::open(path)?;
                let route = if self.is_digital(&pdf) {
                    Route::DigitalPdf
                } else {
                    Route::ScannedPdf
                };
                (route, Some(pdf))
            }
        })
    }

    fn is_digital(&self, pdf: &PdfDocument) -> bool {
        let threshold = self.options.digital_text_threshold;
        (0..pdf.page_count() as usize)
            .any(|index| pdf.page_text(index).trim().chars().count() > threshold)
    }

    /// Extract the layout of one file.
    ///
    /// A missing file or a missing engine capability is an error. Unsupported
    /// inputs yield a `skipped_unsupported` document with no elements.
    pub fn process<P: AsRef<Path>>(
        &mut self,
        path: P,
        style_client: Option<&dyn StyleInference>,
    ) -> Result<LayoutDocument> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("Processing layout for: {}", filename);

        let (route, pdf) = self.classify(path)?;
        log::debug!("Routing {} via {:?}", filename, route);
        let debug_dir = self.options.debug_dir.clone();

        let mut metadata = LayoutMetadata::new(filename, route.origin_type());
        metadata.extraction_id = self.options.extraction_id.clone();

        let pages = match (route, pdf) {
            (Route::DigitalPdf, Some(pdf)) => {
                let pages = self.pdf_engine.detect_all_pages(&pdf);
                let total: usize = pages.iter().map(|p| p.elements.len()).sum();
                log::info!(
                    "Detected {} layout elements across {} pages ({})",
                    total,
                    pages.len(),
                    route.origin_type()
                );
                return Ok(LayoutDocument::new(metadata, pages));
            }
            (Route::Dom, _) => {
                let engine = DomEngine::new(&self.options)?;
                let elements = engine.detect(path)?;
                let (width, height) = engine.viewport();
                vec![single_page(width as f32, height as f32, elements)]
            }
            (Route::ScannedPdf, Some(pdf)) => {
                vec![self.scanned_pdf_page(&pdf, path, style_client, debug_dir.as_deref())?]
            }
            (Route::Image, _) => {
                let image = image::open(path)?;
                let elements = self.vision_engine()?.detect(
                    &image,
                    path,
                    style_client,
                    debug_dir.as_deref(),
                )?;
                vec![single_page(
                    image.width() as f32,
                    image.height() as f32,
                    elements,
                )]
            }
            (Route::Unsupported, _) => {
                log::warn!("Unsupported file type: {}", path.display());
                vec![single_page(0.0, 0.0, Vec::new())]
            }
            (Route::DigitalPdf | Route::ScannedPdf, None) => {
                return Err(Error::PdfParse("document was not opened".to_string()))
            }
        };

        let doc = LayoutDocument::new(metadata, pages);
        log::info!(
            "Detected {} layout elements ({})",
            doc.element_count(),
            doc.metadata.origin_type
        );
        Ok(doc)
    }

    fn vision_engine(&mut self) -> Result<&mut VisionEngine> {
        let engine = match self.vision.take() {
            Some(engine) => engine,
            None => VisionEngine::new(&self.options)?,
        };
        Ok(self.vision.insert(engine))
    }

    /// Run the vision engine over the first page's embedded raster.
    ///
    /// The page is sized in PDF points; element boxes are scaled from raster
    /// pixels into the same space. A document without pages reads as 0x0.
    fn scanned_pdf_page(
        &mut self,
        pdf: &PdfDocument,
        path: &Path,
        style_client: Option<&dyn StyleInference>,
        debug_dir: Option<&Path>,
    ) -> Result<LayoutPage> {
        let (width, height) = pdf
            .page_geometry(0)
            .map(|g| (g.width, g.height))
            .unwrap_or((0.0, 0.0));

        let Some(raster) = first_page_raster(pdf) else {
            log::warn!("No decodable page image in scanned PDF {}", path.display());
            return Ok(single_page(width, height, Vec::new()));
        };
        let elements = self
            .vision_engine()?
            .detect(&raster, path, style_client, debug_dir)?;

        let sx = width / raster.width() as f32;
        let sy = height / raster.height() as f32;
        Ok(single_page(width, height, scale_elements(elements, sx, sy)))
    }
}

impl Default for LayoutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn single_page(width: f32, height: f32, elements: Vec<LayoutElement>) -> LayoutPage {
    let mut page = LayoutPage::new(1, width, height);
    page.elements = elements;
    page
}

/// Scale element boxes by positive factors.
fn scale_elements(elements: Vec<LayoutElement>, sx: f32, sy: f32) -> Vec<LayoutElement> {
    elements
        .into_iter()
        .filter_map(|mut element| {
            let b = element.bbox;
            element.bbox = BBox::new(
                b.x_min() * sx,
                b.y_min() * sy,
                b.x_max() * sx,
                b.y_max() * sy,
            )?;
            Some(element)
        })
        .collect()
}
