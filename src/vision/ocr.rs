//! Text-line detection and recognition backends.

use image::DynamicImage;

use crate::error::Result;

/// One detected text line.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    /// Recognized text
    pub text: String,
    /// `[x_min, y_min, x_max, y_max]` in image pixels, if the detector produced one
    pub bbox: Option<[f32; 4]>,
    /// Detector confidence in `[0, 1]`, if reported
    pub confidence: Option<f32>,
}

impl OcrLine {
    /// Create a line with a box and confidence.
    pub fn new(text: impl Into<String>, bbox: [f32; 4], confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            confidence: Some(confidence),
        }
    }
}

/// Detects and recognizes text lines in a raster image.
///
/// Implementations may hold expensive model state; the vision engine
/// constructs one lazily and reuses it across calls.
pub trait TextLineDetector {
    /// Detect text lines, top to bottom.
    fn detect_lines(&mut self, image: &DynamicImage) -> Result<Vec<OcrLine>>;

    /// Human-readable backend name for logs.
    fn name(&self) -> &str {
        "custom"
    }
}

#[cfg(feature = "ocr")]
pub use tesseract::TesseractDetector;

#[cfg(feature = "ocr")]
mod tesseract {
    use super::{OcrLine, TextLineDetector};
    use crate::error::{Error, Result};
    use image::DynamicImage;
    use leptess::{LepTess, Variable};

    /// Fully automatic page segmentation.
    const PSM_AUTO: &str = "3";

    /// Tesseract-backed detector working at text-line granularity.
    pub struct TesseractDetector {
        engine: LepTess,
        language: String,
    }

    impl TesseractDetector {
        /// Initialise Tesseract for `language` (e.g. `"eng"`, `"eng+deu"`).
        pub fn new(language: &str) -> Result<Self> {
            let mut engine = LepTess::new(None, language).map_err(|e| Error::MissingCapability {
                engine: "vision",
                reason: format!(
                    "failed to initialise Tesseract with language '{}': {}",
                    language, e
                ),
            })?;
            engine
                .set_variable(Variable::TesseditPagesegMode, PSM_AUTO)
                .map_err(|e| Error::Ocr(format!("failed to set page segmentation mode: {}", e)))?;
            Ok(Self {
                engine,
                language: language.to_string(),
            })
        }
    }

    impl TextLineDetector for TesseractDetector {
        fn detect_lines(&mut self, image: &DynamicImage) -> Result<Vec<OcrLine>> {
            let mut png = std::io::Cursor::new(Vec::new());
            image.write_to(&mut png, image::ImageFormat::Png)?;
            self.engine
                .set_image_from_mem(png.get_ref())
                .map_err(|e| Error::Ocr(format!("failed to load image: {}", e)))?;

            // None means no text was found
            let Some(boxes) = self
                .engine
                .get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_TEXTLINE, true)
            else {
                return Ok(Vec::new());
            };

            let mut lines = Vec::new();
            for b in &boxes {
                let geom = b.get_geometry();
                self.engine.set_rectangle(geom.x, geom.y, geom.w, geom.h);
                let text = self.engine.get_utf8_text().unwrap_or_default();
                let confidence = self.engine.mean_text_conf() as f32 / 100.0;
                let bbox = (geom.w > 0 && geom.h > 0).then(|| {
                    [
                        geom.x as f32,
                        geom.y as f32,
                        (geom.x + geom.w) as f32,
                        (geom.y + geom.h) as f32,
                    ]
                });
                lines.push(OcrLine {
                    text: text.trim().to_string(),
                    bbox,
                    confidence: Some(confidence),
                });
            }
            log::debug!(
                "Tesseract ({}) found {} text lines",
                self.language,
                lines.len()
            );
            Ok(lines)
        }

        fn name(&self) -> &str {
            "tesseract"
        }
    }
}
