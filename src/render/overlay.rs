//! Set-of-Mark overlay rendering.
//!
//! Draws each element's box with a numbered tag so a vision-language model can
//! refer to regions by id.

use super::font::LabelWriter;
use crate::model::BBox;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

const OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const TAG_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const TAG_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const OUTLINE_WIDTH: u32 = 2;
const TAG_PADDING: u32 = 2;
const TAG_TEXT_HEIGHT: f32 = 14.0;

/// Draw a box outline `width` pixels thick, clipped to the image.
pub(crate) fn draw_box(img: &mut RgbImage, bbox: &BBox, color: Rgb<u8>, width: u32) {
    let Some(clipped) = bbox.clamp_to(img.width() as f32, img.height() as f32) else {
        return;
    };
    let x = clipped.x_min().floor() as i32;
    let y = clipped.y_min().floor() as i32;
    let w = clipped.width().ceil() as u32;
    let h = clipped.height().ceil() as u32;

    for t in 0..width {
        let inner_w = w.saturating_sub(2 * t);
        let inner_h = h.saturating_sub(2 * t);
        if inner_w == 0 || inner_h == 0 {
            break;
        }
        let rect = Rect::at(x + t as i32, y + t as i32).of_size(inner_w, inner_h);
        draw_hollow_rect_mut(img, rect, color);
    }
}

/// Render a Set-of-Mark overlay.
///
/// Returns a new RGB image; the input is left untouched. Each box gets a green
/// outline and a black tag with its white id at the top-left corner.
pub fn draw_som_overlay(image: &DynamicImage, marks: &[(u32, BBox)]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let writer = LabelWriter::new(TAG_TEXT_HEIGHT);

    for (id, bbox) in marks {
        draw_box(&mut canvas, bbox, OUTLINE, OUTLINE_WIDTH);

        let label = id.to_string();
        let (text_w, text_h) = writer.measure(&label);
        let x = bbox.x_min().max(0.0) as i32;
        let y = bbox.y_min().max(0.0) as i32;
        let tag = Rect::at(x, y).of_size(text_w + TAG_PADDING * 2, text_h + TAG_PADDING * 2);
        draw_filled_rect_mut(&mut canvas, tag, TAG_BACKGROUND);
        writer.draw(
            &mut canvas,
            x + TAG_PADDING as i32,
            y + TAG_PADDING as i32,
            TAG_TEXT,
            &label,
        );
    }

    canvas
}
