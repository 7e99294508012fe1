//! Benchmarks for doclayout.
//!
//! Run with: cargo bench
//!
//! The PDF benchmarks use synthetic documents built in memory.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use doclayout::style::classify_color;
use doclayout::{infer_category, BBox, PdfDocument, PdfEngine};

/// Creates a PDF with `page_count` pages of a heading plus body lines.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for i in 0..page_count {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 18.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new(
                "Tj",
                vec![Object::string_literal(format!("Section {}", i + 1))],
            ),
            Operation::new("ET", vec![]),
        ];
        for line in 0..30 {
            ops.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 11.into()]),
                Operation::new("Td", vec![72.into(), (680 - line * 14).into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(
                        "Benchmark body text for layout extraction performance measurement.",
                    )],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations: ops }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Benchmark whole-document PDF layout at various sizes.
fn bench_pdf_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_engine");
    let engine = PdfEngine::new();

    for page_count in [1, 5, 10].iter() {
        let data = create_test_pdf(*page_count);
        let pdf = PdfDocument::from_bytes(&data).unwrap();

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| engine.detect_all_pages(black_box(&pdf)));
        });
    }

    group.finish();
}

/// Benchmark the digital/scanned text probe.
fn bench_page_text(c: &mut Criterion) {
    let pdf = PdfDocument::from_bytes(&create_test_pdf(1)).unwrap();
    c.bench_function("page_text", |b| {
        b.iter(|| black_box(&pdf).page_text(0));
    });
}

fn bench_classify_color(c: &mut Criterion) {
    let colors = ["#050505", "#fafafa", "#808080", "#ff0000", "#ffd700", "#7b2cbf"];
    c.bench_function("classify_color", |b| {
        b.iter(|| {
            for hex in &colors {
                black_box(classify_color(Some(black_box(hex))));
            }
        });
    });
}

fn bench_infer_category(c: &mut Criterion) {
    let bbox = BBox::new(50.0, 500.0, 400.0, 518.0).unwrap();
    let lines = [
        "INVOICE DETAILS",
        "1. Consulting services",
        "Total $1,240.00",
        "Thank you for your business.",
    ];
    c.bench_function("infer_category", |b| {
        b.iter(|| {
            for text in &lines {
                black_box(infer_category(Some(black_box(text)), &bbox, (1000, 1400)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_pdf_engine,
    bench_page_text,
    bench_classify_color,
    bench_infer_category,
);
criterion_main!(benches);
