//! Label font loading for overlays.
//!
//! A TrueType font is searched for in common system locations and cached for
//! the process lifetime. When none is available, numeric labels fall back to
//! a built-in 3x5 bitmap digit set so overlays stay readable.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use std::sync::OnceLock;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The cached system label font, if one could be loaded.
pub fn label_font() -> Option<&'static FontVec> {
    static FONT: OnceLock<Option<FontVec>> = OnceLock::new();
    FONT.get_or_init(|| {
        for candidate in FONT_CANDIDATES {
            let path = Path::new(candidate);
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    log::debug!("Loaded label font {}", path.display());
                    return Some(font);
                }
                Err(e) => log::debug!("Skipping font {}: {}", path.display(), e),
            }
        }
        log::debug!("No system label font found, using bitmap digits");
        None
    })
    .as_ref()
}

// 3x5 digit glyphs, one row per u8 (low three bits, MSB left)
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Writes short labels onto an image with a fixed pixel height.
pub struct LabelWriter {
    font: Option<&'static FontVec>,
    height: f32,
}

impl LabelWriter {
    /// Create a writer for labels of roughly `height` pixels.
    pub fn new(height: f32) -> Self {
        Self {
            font: label_font(),
            height,
        }
    }

    /// Whether arbitrary text (not only digits) can be drawn.
    pub fn supports_text(&self) -> bool {
        self.font.is_some()
    }

    fn pixel(&self) -> u32 {
        ((self.height / 5.0).round() as u32).max(1)
    }

    /// Width and height of `text` in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self.font {
            Some(font) => {
                let scaled = font.as_scaled(PxScale::from(self.height));
                let width: f32 = text
                    .chars()
                    .map(|c| scaled.h_advance(scaled.glyph_id(c)))
                    .sum();
                (width.ceil() as u32, self.height.ceil() as u32)
            }
            None => {
                let px = self.pixel();
                let glyphs = text.chars().filter(|c| c.is_ascii_digit()).count() as u32;
                let width = (glyphs * 4).saturating_sub(1) * px;
                (width, 5 * px)
            }
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    ///
    /// Without a font only ASCII digits are drawn.
    pub fn draw(&self, img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        match self.font {
            Some(font) => draw_text_mut(img, color, x, y, PxScale::from(self.height), font, text),
            None => self.draw_bitmap(img, x, y, color, text),
        }
    }

    fn draw_bitmap(&self, img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        let px = self.pixel();
        let mut cursor = x;
        for digit in text.chars().filter_map(|c| c.to_digit(10)) {
            for (row, bits) in DIGITS[digit as usize].iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        let rect = Rect::at(cursor + (col * px) as i32, y + (row as u32 * px) as i32)
                            .of_size(px, px);
                        draw_filled_rect_mut(img, rect, color);
                    }
                }
            }
            cursor += (4 * px) as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_digits_draw_pixels() {
        let writer = LabelWriter {
            font: None,
            height: 10.0,
        };
        let (w, h) = writer.measure("12");
        assert_eq!((w, h), (14, 10));

        let mut img = RgbImage::from_pixel(20, 12, Rgb([0, 0, 0]));
        writer.draw(&mut img, 0, 0, Rgb([255, 255, 255]), "12");
        let lit = img.pixels().filter(|p| p.0 == [255, 255, 255]).count();
        assert!(lit > 0);
        assert!(!writer.supports_text());
    }
}
