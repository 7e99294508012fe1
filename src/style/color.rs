//! Color conversion and semantic classification.

use crate::model::ColorClass;
use regex::Regex;
use std::sync::OnceLock;

/// Convert a packed `0xRRGGBB` integer to `#rrggbb`.
pub fn color_int_to_hex(color: u32) -> String {
    let r = (color >> 16) & 0xFF;
    let g = (color >> 8) & 0xFF;
    let b = color & 0xFF;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Pack 8-bit channels into a `0xRRGGBB` integer.
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

fn rgb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^rgba?\s*\(\s*(\d+(?:\.\d+)?)\s*[,\s]\s*(\d+(?:\.\d+)?)\s*[,\s]\s*(\d+(?:\.\d+)?)\s*(?:[,/]\s*([\d.]+%?)\s*)?\)",
        )
        .expect("static regex")
    })
}

/// Convert a CSS color string to `#rrggbb`.
///
/// Handles `#rgb`/`#rrggbb`, `rgb()`/`rgba()` and a small table of named
/// colors. Returns `None` for `transparent`, fully transparent `rgba()` and
/// anything unrecognised.
pub fn css_color_to_hex(css: &str) -> Option<String> {
    let css = css.trim();
    if css.is_empty() {
        return None;
    }

    if let Some(hex) = css.strip_prefix('#') {
        return normalize_hex(hex);
    }

    if let Some(caps) = rgb_regex().captures(css) {
        let channel = |i: usize| -> Option<u8> {
            let v: f32 = caps.get(i)?.as_str().parse().ok()?;
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        if let Some(alpha) = caps.get(4) {
            if alpha_is_zero(alpha.as_str()) {
                return None;
            }
        }
        let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);
        return Some(color_int_to_hex(pack_rgb(r, g, b)));
    }

    let named = match css.to_ascii_lowercase().as_str() {
        "black" => "#000000",
        "white" => "#ffffff",
        "red" => "#ff0000",
        "green" => "#008000",
        "lime" => "#00ff00",
        "blue" => "#0000ff",
        "yellow" => "#ffff00",
        "orange" => "#ffa500",
        "purple" => "#800080",
        "gray" | "grey" => "#808080",
        _ => return None,
    };
    Some(named.to_string())
}

fn alpha_is_zero(alpha: &str) -> bool {
    let value = alpha.trim_end_matches('%');
    value.parse::<f32>().map(|v| v <= 0.0).unwrap_or(false)
}

fn normalize_hex(hex: &str) -> Option<String> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let hex = hex.to_ascii_lowercase();
    match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            Some(format!("#{}", expanded))
        }
        6 => Some(format!("#{}", hex)),
        // #rrggbbaa: drop alpha unless fully transparent
        8 => {
            if &hex[6..] == "00" {
                None
            } else {
                Some(format!("#{}", &hex[..6]))
            }
        }
        _ => None,
    }
}

/// Parse `#rrggbb` into channels.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Classify a `#rrggbb` color into a semantic bucket.
///
/// Near-gray colors (channel deltas under 20) become black, gray or white by
/// brightness; otherwise a channel dominating the other two by more than 50
/// wins, then the orange/yellow/purple ranges apply.
pub fn classify_color(hex: Option<&str>) -> ColorClass {
    let Some((r, g, b)) = hex.and_then(parse_hex) else {
        return ColorClass::Unknown;
    };
    let (r, g, b) = (r as i32, g as i32, b as i32);

    if (r - g).abs() < 20 && (g - b).abs() < 20 {
        let brightness = (r + g + b) as f32 / 3.0;
        return if brightness < 50.0 {
            ColorClass::Black
        } else if brightness > 200.0 {
            ColorClass::White
        } else {
            ColorClass::Gray
        };
    }

    let max = r.max(g).max(b);
    if r == max && r > g + 50 && r > b + 50 {
        ColorClass::Red
    } else if g == max && g > r + 50 && g > b + 50 {
        ColorClass::Green
    } else if b == max && b > r + 50 && b > g + 50 {
        ColorClass::Blue
    } else if r > 200 && g > 150 && b < 100 {
        ColorClass::Orange
    } else if r > 200 && g > 200 && b < 100 {
        // shadowed by orange; kept so the vocabulary stays complete
        ColorClass::Yellow
    } else if r > 100 && b > 100 && g < 100 {
        ColorClass::Purple
    } else {
        ColorClass::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_int_to_hex() {
        assert_eq!(color_int_to_hex(0xFF0000), "#ff0000");
        assert_eq!(color_int_to_hex(0x00000A), "#00000a");
        assert_eq!(color_int_to_hex(pack_rgb(18, 52, 86)), "#123456");
    }

    #[test]
    fn test_css_color_to_hex() {
        assert_eq!(css_color_to_hex("rgb(255, 0, 0)").as_deref(), Some("#ff0000"));
        assert_eq!(
            css_color_to_hex("rgba(16, 32, 48, 0.5)").as_deref(),
            Some("#102030")
        );
        assert_eq!(css_color_to_hex("rgba(0, 0, 0, 0)"), None);
        assert_eq!(css_color_to_hex("#ABC").as_deref(), Some("#aabbcc"));
        assert_eq!(css_color_to_hex("#A1B2C3").as_deref(), Some("#a1b2c3"));
        assert_eq!(css_color_to_hex("Grey").as_deref(), Some("#808080"));
        assert_eq!(css_color_to_hex("transparent"), None);
        assert_eq!(css_color_to_hex("papayawhip"), None);
        assert_eq!(css_color_to_hex(""), None);
    }

    #[test]
    fn test_classify_grays() {
        assert_eq!(classify_color(Some("#050505")), ColorClass::Black);
        assert_eq!(classify_color(Some("#fafafa")), ColorClass::White);
        assert_eq!(classify_color(Some("#808080")), ColorClass::Gray);
        assert_eq!(classify_color(Some("#7a8088")), ColorClass::Gray);
    }

    #[test]
    fn test_classify_hues() {
        assert_eq!(classify_color(Some("#ff0000")), ColorClass::Red);
        assert_eq!(classify_color(Some("#00c000")), ColorClass::Green);
        assert_eq!(classify_color(Some("#1020f0")), ColorClass::Blue);
        assert_eq!(classify_color(Some("#f0c040")), ColorClass::Orange);
        assert_eq!(classify_color(Some("#800080")), ColorClass::Purple);
        assert_eq!(classify_color(Some("#40a0a0")), ColorClass::Other);
    }

    #[test]
    fn test_yellow_reads_as_orange() {
        for hex in ["#ffff00", "#ffd700", "#f0e000"] {
            assert_eq!(classify_color(Some(hex)), ColorClass::Orange, "{hex}");
        }
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(classify_color(None), ColorClass::Unknown);
        assert_eq!(classify_color(Some("red")), ColorClass::Unknown);
        assert_eq!(classify_color(Some("#12")), ColorClass::Unknown);
        assert_eq!(classify_color(Some("#gg0000")), ColorClass::Unknown);
    }
}
