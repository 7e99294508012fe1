//! Heuristic category policy for OCR text lines.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{BBox, Category};

/// Signature of a category policy: text, box and image size `(width, height)`.
pub type CategoryPolicy = fn(Option<&str>, &BBox, (u32, u32)) -> Category;

const TOP_REGION: f32 = 0.15;
const TOP_MIN_HEIGHT: f32 = 20.0;
const BOLD_TITLE_MAX_CHARS: usize = 50;
const CAPS_TITLE_MAX_CHARS: usize = 30;

fn list_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d{1,3}[.):]|[A-Za-z][.):]\s)").expect("static regex"))
}

/// Infer a category from a line's text and position. First matching rule wins:
///
/// 1. box starts in the top 15% of the image and is taller than 20px: Title
/// 2. `<b>` markup and under 50 characters: Title
/// 3. all uppercase and under 30 characters: Title
/// 4. currency symbol, or purely numeric: Text
/// 5. bullet glyph or short numbered/lettered prefix: List-item
/// 6. otherwise Text
pub fn infer_category(text: Option<&str>, bbox: &BBox, image_size: (u32, u32)) -> Category {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Category::Text;
    };
    let clean = text.replace("<b>", "").replace("</b>", "");
    let clean = clean.trim();
    let (_, image_height) = image_size;

    if bbox.y_min() < image_height as f32 * TOP_REGION && bbox.height() > TOP_MIN_HEIGHT {
        return Category::Title;
    }

    if text.contains("<b>") && clean.chars().count() < BOLD_TITLE_MAX_CHARS {
        return Category::Title;
    }

    if is_uppercase(clean) && clean.chars().count() < CAPS_TITLE_MAX_CHARS {
        return Category::Title;
    }

    if text.contains(['$', '£', '€']) || is_numeric(text) {
        return Category::Text;
    }

    if clean.starts_with(['•', '-', '*', '·'])
        || (clean.chars().count() > 2 && list_prefix().is_match(clean))
    {
        return Category::ListItem;
    }

    Category::Text
}

/// At least one cased character and no lowercase ones.
fn is_uppercase(text: &str) -> bool {
    text.chars().any(|c| c.is_uppercase()) && !text.chars().any(|c| c.is_lowercase())
}

/// Digits only, once thousands separators and decimal points are removed.
fn is_numeric(text: &str) -> bool {
    let stripped: String = text.chars().filter(|c| *c != ',' && *c != '.').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}
