//! Font and text-attribute classification from CSS values and PDF font names.

use crate::model::{
    Alignment, FontCategory, FontStyle, FontWeight, Spacing, TextDecoration, TextTransform,
};

/// Font category from a CSS `font-family` list.
pub fn font_category_from_family(family: &str) -> FontCategory {
    let lower = family.to_lowercase();
    if lower.contains("serif") && !lower.contains("sans") {
        FontCategory::Serif
    } else if lower.contains("sans") {
        FontCategory::Sans
    } else if lower.contains("mono") || lower.contains("courier") {
        FontCategory::Mono
    } else {
        FontCategory::Unknown
    }
}

/// Font category from a PDF base font name such as `ABCDEF+Helvetica-Bold`.
pub fn font_category_from_name(name: &str) -> FontCategory {
    let lower = name.to_lowercase();
    if lower.contains("serif") || lower.contains("times") {
        FontCategory::Serif
    } else if lower.contains("sans") || lower.contains("arial") || lower.contains("helvetica") {
        FontCategory::Sans
    } else if lower.contains("mono") || lower.contains("courier") {
        FontCategory::Mono
    } else {
        FontCategory::Unknown
    }
}

/// First family of a CSS `font-family` list, unquoted.
pub fn primary_typeface(family: &str) -> Option<String> {
    let first = family.split(',').next()?.trim().trim_matches(|c| c == '"' || c == '\'');
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Strip a subset tag (`ABCDEF+`) from a PDF font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// Font weight from a CSS `font-weight` value (keyword or number).
pub fn font_weight_from_css(weight: &str) -> FontWeight {
    let lower = weight.trim().to_lowercase();
    if lower.contains("bold") {
        return FontWeight::Bold;
    }
    let value: u32 = lower.parse().unwrap_or(400);
    if value > 600 {
        FontWeight::Bold
    } else if value < 400 {
        FontWeight::Light
    } else {
        FontWeight::Normal
    }
}

/// Font style from a CSS `font-style` value.
pub fn font_style_from_css(style: &str) -> FontStyle {
    let lower = style.to_lowercase();
    if lower.contains("italic") {
        FontStyle::Italic
    } else if lower.contains("oblique") {
        FontStyle::Oblique
    } else {
        FontStyle::Normal
    }
}

/// Parse a CSS pixel length (`"16px"`).
pub fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

/// Alignment from a CSS `text-align` value. `start` and `end` map to left/right.
pub fn alignment_from_css(align: &str) -> Alignment {
    match align.trim().to_lowercase().as_str() {
        "left" | "start" => Alignment::Left,
        "right" | "end" => Alignment::Right,
        "center" => Alignment::Center,
        "justify" => Alignment::Justify,
        _ => Alignment::Unknown,
    }
}

/// Decorations present in a CSS `text-decoration` value.
pub fn decorations_from_css(decoration: &str) -> Option<Vec<TextDecoration>> {
    let lower = decoration.to_lowercase();
    let mut found = Vec::new();
    if lower.contains("underline") {
        found.push(TextDecoration::Underline);
    }
    if lower.contains("line-through") || lower.contains("strikethrough") {
        found.push(TextDecoration::Strikethrough);
    }
    if lower.contains("overline") {
        found.push(TextDecoration::Overline);
    }
    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}

/// Letter spacing relative to the font size. `normal` stays normal.
pub fn letter_spacing_bucket(value: &str, font_size: Option<f32>) -> Spacing {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("normal") {
        return Spacing::Normal;
    }
    match (parse_px(trimmed), font_size) {
        (Some(px), Some(size)) if size > 0.0 => {
            let ratio = px / size;
            if ratio < -0.01 {
                Spacing::Tight
            } else if ratio > 0.05 {
                Spacing::Loose
            } else {
                Spacing::Normal
            }
        }
        _ => Spacing::Unknown,
    }
}

/// Line height relative to the font size. `normal` stays normal.
pub fn line_height_bucket(value: &str, font_size: Option<f32>) -> Spacing {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("normal") {
        return Spacing::Normal;
    }
    let ratio = match (parse_px(trimmed), font_size) {
        (Some(px), Some(size)) if size > 0.0 => px / size,
        // unitless multiplier
        (None, _) => match trimmed.parse::<f32>() {
            Ok(v) => v,
            Err(_) => return Spacing::Unknown,
        },
        _ => return Spacing::Unknown,
    };
    if ratio < 1.1 {
        Spacing::Tight
    } else if ratio > 1.6 {
        Spacing::Loose
    } else {
        Spacing::Normal
    }
}

/// Text transform from a CSS `text-transform` value.
pub fn text_transform_from_css(value: &str) -> TextTransform {
    match value.trim().to_lowercase().as_str() {
        "uppercase" => TextTransform::Uppercase,
        "lowercase" => TextTransform::Lowercase,
        "capitalize" => TextTransform::Capitalize,
        "none" | "normal" => TextTransform::Normal,
        _ => TextTransform::Unknown,
    }
}
