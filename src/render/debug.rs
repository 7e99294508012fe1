//! Diagnostic artifacts for raster detection.
//!
//! Writes `<stem>_layout.png` (boxes color-coded by category) and
//! `<stem>_legend.txt` into a debug directory.

use super::font::LabelWriter;
use super::overlay::draw_box;
use crate::error::Result;
use crate::model::{Category, LayoutElement};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const PREVIEW_CHARS: usize = 30;
const LEGEND_CHARS: usize = 100;

/// Outline color for a category.
pub fn category_color(category: Category) -> Rgb<u8> {
    match category {
        Category::Title => Rgb([255, 0, 0]),
        Category::Text => Rgb([0, 255, 0]),
        Category::Picture => Rgb([0, 0, 255]),
        Category::Table => Rgb([255, 0, 255]),
        Category::ListItem => Rgb([0, 255, 255]),
        Category::Header | Category::Footer => Rgb([255, 165, 0]),
        Category::Caption => Rgb([255, 255, 0]),
        _ => Rgb([136, 136, 136]),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Paths of the artifacts written for one source file.
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    pub layout_image: PathBuf,
    pub legend: PathBuf,
}

/// Draw every element with an `id: category` tag and a text preview.
pub fn render_layout_image(image: &DynamicImage, elements: &[LayoutElement]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let writer = LabelWriter::new(12.0);

    for element in elements {
        let color = category_color(element.category);
        draw_box(&mut canvas, &element.bbox, color, 2);

        let x = element.bbox.x_min() as i32;
        let label = if writer.supports_text() {
            format!("{}: {}", element.id, element.category)
        } else {
            element.id.to_string()
        };
        let (w, h) = writer.measure(&label);
        let tag_y = element.bbox.y_min() as i32 - (h as i32 + 4);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(x, tag_y).of_size(w + 4, h + 4),
            color,
        );
        writer.draw(&mut canvas, x + 2, tag_y + 2, Rgb([255, 255, 255]), &label);

        if writer.supports_text() {
            if let Some(text) = element.text_content.as_deref() {
                let preview = truncate(text, PREVIEW_CHARS);
                writer.draw(
                    &mut canvas,
                    x + 2,
                    element.bbox.y_max() as i32 + 2,
                    color,
                    &preview,
                );
            }
        }
    }

    canvas
}

/// Plain-text legend listing every element.
pub fn render_legend(elements: &[LayoutElement]) -> String {
    let mut out = String::from("Layout Detection Debug\n");
    out.push_str(&"=".repeat(40));
    out.push_str("\n\n");
    for element in elements {
        let [x0, y0, x1, y1] = element.bbox.to_array();
        let _ = writeln!(out, "ID {}: {}", element.id, element.category);
        let _ = writeln!(out, "  BBox: [{:.1}, {:.1}, {:.1}, {:.1}]", x0, y0, x1, y1);
        if let Some(text) = element.text_content.as_deref() {
            let _ = writeln!(out, "  Text: {}", truncate(text, LEGEND_CHARS));
        }
        out.push('\n');
    }
    out
}

/// Write both artifacts for `source` into `debug_dir`, creating it if needed.
pub fn write_debug_artifacts(
    debug_dir: &Path,
    source: &Path,
    image: &DynamicImage,
    elements: &[LayoutElement],
) -> Result<DebugArtifacts> {
    std::fs::create_dir_all(debug_dir)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let layout_image = debug_dir.join(format!("{}_layout.png", stem));
    render_layout_image(image, elements).save(&layout_image)?;
    log::info!("Saved debug image: {}", layout_image.display());

    let legend = debug_dir.join(format!("{}_legend.txt", stem));
    std::fs::write(&legend, render_legend(elements))?;
    log::info!("Saved legend: {}", legend.display());

    Ok(DebugArtifacts {
        layout_image,
        legend,
    })
}
