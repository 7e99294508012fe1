//! Integration tests for the routing orchestrator and the vision path.

mod common;

use common::{
    build_pdf, temp_file, write_png, CannedClient, FailingClient, FixedDetector, GrayImage,
    PageSpec, TextRun,
};
use doclayout::{
    Category, FontWeight, JsonFormat, LayoutDocument, LayoutExtractor, LayoutOptions,
    LayoutStyle, OcrLine, OriginType, VisionEngine,
};

fn receipt_lines() -> Vec<OcrLine> {
    vec![
        OcrLine::new("CORNER STORE", [40.0, 10.0, 360.0, 45.0], 0.98),
        OcrLine::new("• oat milk", [40.0, 120.0, 200.0, 138.0], 0.91),
        OcrLine::new("Total $12.40", [40.0, 200.0, 260.0, 218.0], 0.87),
        OcrLine {
            text: "smudge".to_string(),
            bbox: None,
            confidence: Some(0.2),
        },
    ]
}

fn vision_extractor(options: LayoutOptions) -> LayoutExtractor {
    LayoutExtractor::with_options(options)
        .with_vision_engine(VisionEngine::with_detector(FixedDetector(receipt_lines())))
}

#[test]
fn test_unsupported_extension_is_skipped() {
    let file = temp_file(b"PK\x03\x04 not really a zip", ".zip");
    let doc = LayoutExtractor::new().process(file.path(), None).unwrap();

    assert_eq!(doc.metadata.origin_type, OriginType::SkippedUnsupported);
    assert_eq!(doc.metadata.page_count, 1);
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.element_count(), 0);
}

#[test]
fn test_image_through_vision_engine() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "receipt.png", 400, 300);

    let mut extractor = vision_extractor(LayoutOptions::new().with_extraction_id("rcpt-1"));
    let doc = extractor.process(&png, None).unwrap();

    assert_eq!(doc.metadata.filename, "receipt.png");
    assert_eq!(doc.metadata.origin_type, OriginType::ScannedImage);
    assert_eq!(doc.metadata.extraction_id.as_deref(), Some("rcpt-1"));

    let page = &doc.pages[0];
    assert_eq!((page.page_no, page.width, page.height), (1, 400.0, 300.0));

    let categories: Vec<Category> = page.elements.iter().map(|e| e.category).collect();
    assert_eq!(
        categories,
        vec![Category::Title, Category::ListItem, Category::Text]
    );
    let ids: Vec<u32> = page.elements.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(page.elements.iter().all(|e| e.style.is_none()));
    assert!(page.elements.iter().all(|e| e.confidence < 1.0));
}

#[test]
fn test_failing_style_client_keeps_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "scan.png", 400, 300);

    let doc = vision_extractor(LayoutOptions::new())
        .process(&png, Some(&FailingClient))
        .unwrap();

    assert_eq!(doc.element_count(), 3);
    assert!(doc.elements().all(|e| e.style.is_none() && e.has_text()));
}

#[test]
fn test_style_client_results_merged() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "scan.png", 400, 300);
    let client = CannedClient(LayoutStyle {
        font_weight: FontWeight::Bold,
        ..Default::default()
    });

    let doc = vision_extractor(LayoutOptions::new())
        .process(&png, Some(&client))
        .unwrap();

    assert!(doc
        .elements()
        .all(|e| e.style.as_ref().map(|s| s.font_weight) == Some(FontWeight::Bold)));
}

#[test]
fn test_debug_artifacts_written() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "invoice.png", 400, 300);
    let debug_dir = dir.path().join("debug");

    vision_extractor(LayoutOptions::new().with_debug_dir(&debug_dir))
        .process(&png, None)
        .unwrap();

    assert!(debug_dir.join("invoice_layout.png").exists());
    let legend = std::fs::read_to_string(debug_dir.join("invoice_legend.txt")).unwrap();
    assert!(legend.starts_with("Layout Detection Debug"));
    assert!(legend.contains("ID 1: Title"));
    assert!(legend.contains("Text: CORNER STORE"));
}

#[test]
fn test_scanned_pdf_uses_page_raster() {
    let bytes = build_pdf(&[PageSpec::letter(vec![]).with_image(GrayImage {
        pixels_wide: 400,
        pixels_high: 300,
        x: 0.0,
        y: 0.0,
        width: 612.0,
        height: 792.0,
    })]);
    let file = temp_file(&bytes, ".pdf");

    let doc = vision_extractor(LayoutOptions::new())
        .process(file.path(), None)
        .unwrap();

    assert_eq!(doc.metadata.origin_type, OriginType::ScannedImage);
    let page = &doc.pages[0];
    assert_eq!((page.width, page.height), (612.0, 792.0));
    assert_eq!(page.elements.len(), 3);

    // raster pixels scaled into page points
    let first = page.elements[0].bbox;
    assert!((first.x_min() - 40.0 * 612.0 / 400.0).abs() < 0.01);
    assert!((first.y_max() - 45.0 * 792.0 / 300.0).abs() < 0.01);
}

#[test]
fn test_scanned_pdf_without_raster_has_no_elements() {
    let file = temp_file(
        &build_pdf(&[PageSpec::letter(vec![TextRun::new("p. 3", 9.0, 300.0, 30.0)])]),
        ".pdf",
    );
    let doc = vision_extractor(LayoutOptions::new())
        .process(file.path(), None)
        .unwrap();

    assert_eq!(doc.metadata.origin_type, OriginType::ScannedImage);
    assert_eq!(doc.element_count(), 0);
}

#[test]
fn test_scanned_pdf_without_raster_needs_no_detector() {
    let file = temp_file(
        &build_pdf(&[PageSpec::letter(vec![]).with_media_box([0.0, 0.0, 595.0, 842.0])]),
        ".pdf",
    );
    let doc = LayoutExtractor::new().process(file.path(), None).unwrap();

    assert_eq!(doc.metadata.origin_type, OriginType::ScannedImage);
    let page = &doc.pages[0];
    assert_eq!((page.width, page.height), (595.0, 842.0));
    assert!(page.elements.is_empty());
}

#[test]
fn test_pdf_without_pages_is_zero_sized() {
    let file = temp_file(&build_pdf(&[]), ".pdf");
    let doc = LayoutExtractor::new().process(file.path(), None).unwrap();

    assert_eq!(doc.metadata.origin_type, OriginType::ScannedImage);
    assert_eq!(doc.pages.len(), 1);
    assert_eq!((doc.pages[0].width, doc.pages[0].height), (0.0, 0.0));
    assert_eq!(doc.element_count(), 0);
}

#[test]
fn test_digital_pdf_document() {
    let body = "This paragraph has comfortably more than fifty characters of text.";
    let file = temp_file(
        &build_pdf(&[
            PageSpec::letter(vec![
                TextRun::new("Annual Report", 20.0, 72.0, 720.0),
                TextRun::new(body, 11.0, 110.0, 660.0),
            ]),
            PageSpec::letter(vec![TextRun::new("Appendix", 16.0, 72.0, 720.0)]),
        ]),
        ".pdf",
    );

    let doc = LayoutExtractor::new().process(file.path(), None).unwrap();
    assert_eq!(doc.metadata.origin_type, OriginType::DigitalPdf);
    assert_eq!(doc.metadata.page_count, 2);

    let ids: Vec<u32> = doc.elements().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(doc.elements().all(|e| e.confidence == 1.0));
    assert_eq!(doc.pages[1].elements[0].category, Category::Title);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "scan.png", 400, 300);
    let client = CannedClient(LayoutStyle {
        font_weight: FontWeight::Bold,
        text_color_hex: Some("#1a1a1a".to_string()),
        ..Default::default()
    });
    let doc = vision_extractor(LayoutOptions::new().with_extraction_id("rt"))
        .process(&png, Some(&client))
        .unwrap();

    let json = doc.to_json(JsonFormat::Pretty).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["origin_type"], "scanned_image");
    assert_eq!(value["pages"][0]["elements"][1]["category"], "List-item");
    assert_eq!(
        value["pages"][0]["elements"][0]["bbox"],
        serde_json::json!([40.0, 10.0, 360.0, 45.0])
    );

    let parsed = LayoutDocument::from_json(&json).unwrap();
    assert_eq!(parsed, doc);
}
