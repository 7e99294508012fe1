//! Style classification utilities.
//!
//! Pure functions mapping raw colors and font descriptions onto the closed
//! vocabularies in [`crate::model`]. Shared by the DOM and PDF engines.

mod color;
mod font;

pub use color::{classify_color, color_int_to_hex, css_color_to_hex, pack_rgb, parse_hex};
pub use font::{
    alignment_from_css, decorations_from_css, font_category_from_family, font_category_from_name,
    font_style_from_css, font_weight_from_css, letter_spacing_bucket, line_height_bucket,
    parse_px, primary_typeface, strip_subset_prefix, text_transform_from_css,
};
