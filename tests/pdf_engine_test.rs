//! Integration tests for the PDF layout engine.

mod common;

use common::{build_pdf, temp_file, GrayImage, PageSpec, TextRun};
use doclayout::{
    Category, ColorClass, FontCategory, FontWeight, LayoutExtractor, PdfDocument, PdfEngine,
    Route,
};

fn open(pages: &[PageSpec]) -> PdfDocument {
    PdfDocument::from_bytes(&build_pdf(pages)).unwrap()
}

#[test]
fn test_title_threshold_is_exclusive() {
    let pdf = open(&[PageSpec::letter(vec![
        TextRun::new("Fifteen Point Heading", 15.0, 72.0, 720.0),
        TextRun::new("Fourteen point body text", 14.0, 110.0, 600.0),
    ])]);

    let elements = PdfEngine::new().detect(&pdf, 0);
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].category, Category::Title);
    assert_eq!(
        elements[0].text_content.as_deref(),
        Some("Fifteen Point Heading")
    );
    assert_eq!(elements[1].category, Category::Text);
    assert_eq!(elements[0].id, 1);
    assert_eq!(elements[1].id, 2);
}

#[test]
fn test_block_takes_first_span_style() {
    let pdf = open(&[PageSpec::letter(vec![
        TextRun::new("Bold lead-in", 12.0, 72.0, 500.0)
            .font("F2")
            .rgb(1.0, 0.0, 0.0),
        TextRun::new("regular continuation", 12.0, 72.0, 484.0),
        TextRun::new("far below", 12.0, 72.0, 300.0).font("F3"),
    ])]);

    let elements = PdfEngine::new().detect(&pdf, 0);
    assert_eq!(elements.len(), 2);

    let lead = &elements[0];
    assert_eq!(
        lead.text_content.as_deref(),
        Some("Bold lead-in regular continuation")
    );
    let style = lead.style.as_ref().unwrap();
    assert_eq!(style.font_weight, FontWeight::Bold);
    assert_eq!(style.font_category, FontCategory::Serif);
    assert_eq!(style.font_size, Some(12.0));
    assert_eq!(style.text_color_hex.as_deref(), Some("#ff0000"));
    assert_eq!(style.text_color_class, ColorClass::Red);

    let mono = elements[1].style.as_ref().unwrap();
    assert_eq!(mono.font_category, FontCategory::Mono);
    assert_eq!(mono.text_color_class, ColorClass::Black);
}

#[test]
fn test_bbox_is_top_left_origin() {
    let pdf = open(&[PageSpec::letter(vec![TextRun::new(
        "Near the top",
        12.0,
        72.0,
        720.0,
    )])]);
    let elements = PdfEngine::new().detect(&pdf, 0);
    let bbox = elements[0].bbox;
    assert!((bbox.x_min() - 72.0).abs() < 0.5);
    assert!(bbox.y_min() < 72.0 && bbox.y_max() > 72.0 - 12.0);
    assert!(bbox.x_max() > bbox.x_min() && bbox.y_max() > bbox.y_min());
}

#[test]
fn test_image_block_is_picture() {
    let pdf = open(&[PageSpec::letter(vec![TextRun::new(
        "Figure 1: sample",
        10.0,
        100.0,
        380.0,
    )])
    .with_image(GrayImage {
        pixels_wide: 20,
        pixels_high: 10,
        x: 100.0,
        y: 400.0,
        width: 200.0,
        height: 100.0,
    })]);

    let elements = PdfEngine::new().detect(&pdf, 0);
    let picture = elements
        .iter()
        .find(|e| e.category == Category::Picture)
        .expect("picture element");
    assert_eq!(picture.text_content, None);
    assert!(picture.style.is_none());
    assert_eq!(picture.bbox.to_array(), [100.0, 292.0, 300.0, 392.0]);
}

#[test]
fn test_ids_continue_across_pages() {
    let pdf = open(&[
        PageSpec::letter(vec![
            TextRun::new("Page one title", 18.0, 72.0, 720.0),
            TextRun::new("Page one body", 11.0, 110.0, 650.0),
        ]),
        PageSpec::letter(vec![
            TextRun::new("Page two title", 18.0, 72.0, 520.0),
            TextRun::new("Page two body", 11.0, 110.0, 450.0),
        ])
        .with_media_box([0.0, 0.0, 842.0, 595.0]),
    ]);

    let pages = PdfEngine::new().detect_all_pages(&pdf);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].page_no, 2);
    assert_eq!((pages[1].width, pages[1].height), (842.0, 595.0));

    let ids: Vec<u32> = pages
        .iter()
        .flat_map(|p| p.elements.iter().map(|e| e.id))
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    // single-page detection restarts at 1
    let second = PdfEngine::new().detect(&pdf, 1);
    assert_eq!(second[0].id, 1);
}

#[test]
fn test_out_of_range_page_is_empty() {
    let pdf = open(&[PageSpec::letter(vec![TextRun::new("only", 12.0, 72.0, 700.0)])]);
    assert!(PdfEngine::new().detect(&pdf, 5).is_empty());
}

#[test]
fn test_digital_classification_boundary() {
    let fifty = "a".repeat(50);
    let fifty_one = "a".repeat(51);

    let scanned = temp_file(
        &build_pdf(&[PageSpec::letter(vec![TextRun::new(&fifty, 8.0, 20.0, 700.0)])]),
        ".pdf",
    );
    let digital = temp_file(
        &build_pdf(&[
            PageSpec::letter(vec![TextRun::new("short", 8.0, 20.0, 700.0)]),
            PageSpec::letter(vec![TextRun::new(&fifty_one, 8.0, 20.0, 700.0)]),
        ]),
        ".pdf",
    );

    let extractor = LayoutExtractor::new();
    assert_eq!(extractor.route(scanned.path()).unwrap(), Route::ScannedPdf);
    assert_eq!(extractor.route(digital.path()).unwrap(), Route::DigitalPdf);
}

#[test]
fn test_page_text() {
    let pdf = open(&[PageSpec::letter(vec![
        TextRun::new("Hello", 12.0, 72.0, 700.0),
        TextRun::new("World", 12.0, 72.0, 680.0),
    ])]);
    assert_eq!(pdf.page_count(), 1);
    assert_eq!(pdf.page_text(0), "Hello World");
}
