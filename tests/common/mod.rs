//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use doclayout::error::Result;
use doclayout::{LayoutStyle, OcrLine, StyleInference, TextLineDetector};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tempfile::NamedTempFile;

/// One `Tj` in its own text object.
#[derive(Clone)]
pub struct TextRun {
    pub text: String,
    /// Font resource name: `F1` Helvetica, `F2` Times-Bold, `F3` Courier
    pub font: &'static str,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub rgb: Option<(f32, f32, f32)>,
}

impl TextRun {
    pub fn new(text: &str, size: f32, x: f32, y: f32) -> Self {
        Self {
            text: text.to_string(),
            font: "F1",
            size,
            x,
            y,
            rgb: None,
        }
    }

    pub fn font(mut self, font: &'static str) -> Self {
        self.font = font;
        self
    }

    pub fn rgb(mut self, r: f32, g: f32, b: f32) -> Self {
        self.rgb = Some((r, g, b));
        self
    }
}

/// An 8-bit gray image drawn at `(x, y)` with the given size in points.
#[derive(Clone)]
pub struct GrayImage {
    pub pixels_wide: u32,
    pub pixels_high: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone)]
pub struct PageSpec {
    pub media_box: [f32; 4],
    pub runs: Vec<TextRun>,
    pub image: Option<GrayImage>,
}

impl PageSpec {
    pub fn letter(runs: Vec<TextRun>) -> Self {
        Self {
            media_box: [0.0, 0.0, 612.0, 792.0],
            runs,
            image: None,
        }
    }

    pub fn with_image(mut self, image: GrayImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_media_box(mut self, media_box: [f32; 4]) -> Self {
        self.media_box = media_box;
        self
    }
}

fn font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
    })
}

fn page_content(spec: &PageSpec) -> Content {
    let mut ops = Vec::new();
    if let Some(img) = &spec.image {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                img.width.into(),
                0.into(),
                0.into(),
                img.height.into(),
                img.x.into(),
                img.y.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec!["Im1".into()]));
        ops.push(Operation::new("Q", vec![]));
    }
    for run in &spec.runs {
        ops.push(Operation::new("BT", vec![]));
        // fill color is graphics state and outlives ET, so set it on every run
        let (r, g, b) = run.rgb.unwrap_or((0.0, 0.0, 0.0));
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new("Tf", vec![run.font.into(), run.size.into()]));
        ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(run.text.as_str())],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    Content { operations: ops }
}

/// Build a PDF with one page per `PageSpec`. Fonts live on the page tree root so
/// pages inherit them.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let f1 = font(&mut doc, "Helvetica");
    let f2 = font(&mut doc, "Times-Bold");
    let f3 = font(&mut doc, "Courier");

    let mut kids = Vec::new();
    for spec in pages {
        let content = page_content(spec).encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => spec.media_box.iter().map(|v| Object::from(*v)).collect::<Vec<_>>(),
        };

        if let Some(img) = &spec.image {
            let samples: Vec<u8> = (0..img.pixels_wide * img.pixels_high)
                .map(|i| (i % 251) as u8)
                .collect();
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => img.pixels_wide as i64,
                    "Height" => img.pixels_high as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                samples,
            ));
            page.set(
                "Resources",
                dictionary! {
                    "Font" => dictionary! { "F1" => f1, "F2" => f2, "F3" => f3 },
                    "XObject" => dictionary! { "Im1" => image_id },
                },
            );
        }

        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => f1, "F2" => f2, "F3" => f3 },
            },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save pdf");
    out
}

/// Write bytes to a temp file with the given suffix.
pub fn temp_file(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Save a white RGB image of the given size as PNG under `dir`.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]))
        .save(&path)
        .expect("save png");
    path
}

/// Detector returning a fixed set of lines.
pub struct FixedDetector(pub Vec<OcrLine>);

impl TextLineDetector for FixedDetector {
    fn detect_lines(&mut self, _image: &DynamicImage) -> Result<Vec<OcrLine>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Style client that always fails.
pub struct FailingClient;

impl StyleInference for FailingClient {
    fn extract_styles(
        &self,
        _image: &DynamicImage,
        _ids: &[u32],
    ) -> Result<HashMap<u32, LayoutStyle>> {
        Err(doclayout::Error::StyleInference(
            "503 Service Unavailable".to_string(),
        ))
    }
}

/// Style client returning a canned style for every id it is asked about.
pub struct CannedClient(pub LayoutStyle);

impl StyleInference for CannedClient {
    fn extract_styles(
        &self,
        image: &DynamicImage,
        ids: &[u32],
    ) -> Result<HashMap<u32, LayoutStyle>> {
        assert!(image.width() > 0 && image.height() > 0);
        Ok(ids.iter().map(|id| (*id, self.0.clone())).collect())
    }
}
