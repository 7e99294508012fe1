//! DOM layout engine.
//!
//! Renders an HTML file in headless Chrome and reads each visible element's
//! bounding rectangle and computed style. Elements are reported in document
//! order.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{BBox, Category, LayoutElement, LayoutStyle};
use crate::options::LayoutOptions;
use crate::style::{
    alignment_from_css, classify_color, css_color_to_hex, decorations_from_css,
    font_category_from_family, font_style_from_css, font_weight_from_css, letter_spacing_bucket,
    line_height_bucket, parse_px, primary_typeface, text_transform_from_css,
};

/// Tags the in-page script collects.
pub const TAG_WHITELIST: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "table", "img", "div", "span", "li", "pre", "code",
    "blockquote", "header", "footer", "figure", "nav", "article", "section",
];

/// Map an HTML tag name to a category.
pub fn category_for_tag(tag: &str) -> Category {
    match tag.to_ascii_lowercase().as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Category::Title,
        "li" => Category::ListItem,
        "table" => Category::Table,
        "img" | "figure" => Category::Picture,
        "pre" | "code" => Category::Code,
        "header" => Category::Header,
        "footer" => Category::Footer,
        _ => Category::Text,
    }
}

/// Computed CSS values as reported by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDomStyle {
    pub font_family: String,
    pub font_weight: String,
    pub font_style: String,
    pub font_size: String,
    pub color: String,
    pub background_color: String,
    pub text_align: String,
    pub text_decoration: String,
    pub letter_spacing: String,
    pub line_height: String,
    pub text_transform: String,
}

/// One element as collected by the in-page script.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDomElement {
    /// Lowercase tag name
    pub tag: String,
    /// `innerText`, or the `alt` attribute for images
    #[serde(default)]
    pub text: String,
    /// `[left, top, right, bottom]` in document pixels
    pub bbox: [f32; 4],
    #[serde(default)]
    pub style: RawDomStyle,
}

fn collect_script() -> String {
    let selector = TAG_WHITELIST.join(",");
    format!(
        r#"(() => {{
    const out = [];
    document.querySelectorAll("{selector}").forEach(el => {{
        if (el.offsetParent === null && el.tagName !== 'BODY') return;
        const isImg = el.tagName === 'IMG';
        const text = isImg ? (el.alt || '') : (el.innerText || '').trim();
        if (!isImg && text.length === 0) return;
        const rect = el.getBoundingClientRect();
        const cs = window.getComputedStyle(el);
        out.push({{
            tag: el.tagName.toLowerCase(),
            text: text,
            bbox: [rect.left + window.scrollX, rect.top + window.scrollY,
                   rect.right + window.scrollX, rect.bottom + window.scrollY],
            style: {{
                fontFamily: cs.fontFamily,
                fontWeight: cs.fontWeight,
                fontStyle: cs.fontStyle,
                fontSize: cs.fontSize,
                color: cs.color,
                backgroundColor: cs.backgroundColor,
                textAlign: cs.textAlign,
                textDecoration: cs.textDecorationLine || cs.textDecoration,
                letterSpacing: cs.letterSpacing,
                lineHeight: cs.lineHeight,
                textTransform: cs.textTransform
            }}
        }});
    }});
    return JSON.stringify(out);
}})()"#
    )
}

/// Convert raw DOM records into layout elements.
///
/// Degenerate boxes are dropped and ids assigned from 1 without gaps.
pub fn normalize_dom_elements(raw: Vec<RawDomElement>) -> Vec<LayoutElement> {
    let mut elements = Vec::with_capacity(raw.len());
    for item in raw {
        let [x0, y0, x1, y1] = item.bbox;
        let Some(bbox) = BBox::new(x0, y0, x1, y1) else {
            log::debug!("Dropping <{}> with degenerate box {:?}", item.tag, item.bbox);
            continue;
        };
        let text = item.text.trim();
        let mut element = LayoutElement::new(
            elements.len() as u32 + 1,
            category_for_tag(&item.tag),
            bbox,
        )
        .with_style(computed_style(&item.style));
        if !text.is_empty() {
            element = element.with_text(text);
        }
        elements.push(element);
    }
    elements
}

fn computed_style(css: &RawDomStyle) -> LayoutStyle {
    let font_size = parse_px(&css.font_size);
    let text_color_hex = css_color_to_hex(&css.color);
    LayoutStyle {
        font_category: font_category_from_family(&css.font_family),
        typeface_name: primary_typeface(&css.font_family),
        font_weight: font_weight_from_css(&css.font_weight),
        font_style: font_style_from_css(&css.font_style),
        font_size,
        text_color_class: classify_color(text_color_hex.as_deref()),
        text_color_hex,
        background_color: css_color_to_hex(&css.background_color),
        alignment: alignment_from_css(&css.text_align),
        letter_spacing: letter_spacing_bucket(&css.letter_spacing, font_size),
        line_height: line_height_bucket(&css.line_height, font_size),
        text_decoration: decorations_from_css(&css.text_decoration),
        text_transform: text_transform_from_css(&css.text_transform),
    }
}

/// Detects layout elements in HTML via a headless browser.
///
/// A browser is launched per call and closed when the call returns.
#[cfg_attr(not(feature = "dom"), allow(dead_code))]
pub struct DomEngine {
    browser_path: PathBuf,
    viewport: (u32, u32),
}

impl DomEngine {
    /// Locate a Chrome/Chromium executable.
    ///
    /// Fails with [`Error::MissingCapability`] when none is found or the
    /// crate was built without the `dom` feature.
    #[cfg(feature = "dom")]
    pub fn new(options: &LayoutOptions) -> Result<Self> {
        let browser_path = match &options.browser_path {
            Some(path) if path.exists() => path.clone(),
            Some(path) => {
                return Err(Error::MissingCapability {
                    engine: "dom",
                    reason: format!("browser executable {} does not exist", path.display()),
                })
            }
            None => headless_chrome::browser::default_executable().map_err(|reason| {
                Error::MissingCapability {
                    engine: "dom",
                    reason,
                }
            })?,
        };
        log::debug!("Using browser at {}", browser_path.display());
        Ok(Self {
            browser_path,
            viewport: options.viewport,
        })
    }

    /// Locate a Chrome/Chromium executable.
    ///
    /// Fails with [`Error::MissingCapability`] when none is found or the
    /// crate was built without the `dom` feature.
    #[cfg(not(feature = "dom"))]
    pub fn new(_options: &LayoutOptions) -> Result<Self> {
        Err(Error::MissingCapability {
            engine: "dom",
            reason: "built without the `dom` feature".to_string(),
        })
    }

    /// Render `path` and collect its elements.
    #[cfg(feature = "dom")]
    pub fn detect(&self, path: &Path) -> Result<Vec<LayoutElement>> {
        use headless_chrome::{Browser, LaunchOptions};

        let absolute = std::fs::canonicalize(path)?;
        let url = format!("file://{}", absolute.display());
        log::debug!("Processing HTML file: {}", url);

        let launch = LaunchOptions::default_builder()
            .headless(true)
            .path(Some(self.browser_path.clone()))
            .window_size(Some(self.viewport))
            .build()
            .map_err(|e| Error::Browser(e.to_string()))?;
        let browser = Browser::new(launch).map_err(|e| Error::Browser(e.to_string()))?;
        let tab = browser.new_tab().map_err(|e| Error::Browser(e.to_string()))?;
        tab.navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| Error::Browser(format!("failed to load {}: {}", url, e)))?;

        let result = tab
            .evaluate(&collect_script(), false)
            .map_err(|e| Error::Browser(format!("script failed: {}", e)))?;
        let payload = match result.value {
            Some(serde_json::Value::String(json)) => json,
            other => {
                return Err(Error::Browser(format!(
                    "unexpected script result: {:?}",
                    other
                )))
            }
        };
        let raw: Vec<RawDomElement> = serde_json::from_str(&payload)?;
        log::debug!("Extracted {} raw elements from DOM", raw.len());

        let elements = normalize_dom_elements(raw);
        log::debug!("Processed {} layout elements", elements.len());
        Ok(elements)
    }

    /// Render `path` and collect its elements.
    #[cfg(not(feature = "dom"))]
    pub fn detect(&self, _path: &Path) -> Result<Vec<LayoutElement>> {
        Err(Error::MissingCapability {
            engine: "dom",
            reason: "built without the `dom` feature".to_string(),
        })
    }

    /// Window size used for rendering.
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Alignment, ColorClass, FontCategory, FontWeight, Spacing, TextDecoration, TextTransform,
    };

    fn raw(json: serde_json::Value) -> Vec<RawDomElement> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_tag_categories() {
        assert_eq!(category_for_tag("H2"), Category::Title);
        assert_eq!(category_for_tag("li"), Category::ListItem);
        assert_eq!(category_for_tag("figure"), Category::Picture);
        assert_eq!(category_for_tag("code"), Category::Code);
        assert_eq!(category_for_tag("footer"), Category::Footer);
        assert_eq!(category_for_tag("section"), Category::Text);
        assert_eq!(category_for_tag("marquee"), Category::Text);
    }

    #[test]
    fn test_normalize_styles() {
        let elements = normalize_dom_elements(raw(serde_json::json!([{
            "tag": "h1",
            "text": "  Quarterly Results ",
            "bbox": [8.0, 21.4, 1912.0, 58.4],
            "style": {
                "fontFamily": "\"Times New Roman\", serif",
                "fontWeight": "700",
                "fontStyle": "normal",
                "fontSize": "32px",
                "color": "rgb(255, 0, 0)",
                "backgroundColor": "rgba(0, 0, 0, 0)",
                "textAlign": "center",
                "textDecoration": "underline line-through",
                "letterSpacing": "normal",
                "lineHeight": "60px",
                "textTransform": "uppercase"
            }
        }])));

        assert_eq!(elements.len(), 1);
        let el = &elements[0];
        assert_eq!(el.id, 1);
        assert_eq!(el.category, Category::Title);
        assert_eq!(el.text_content.as_deref(), Some("Quarterly Results"));

        let style = el.style.as_ref().unwrap();
        assert_eq!(style.font_category, FontCategory::Serif);
        assert_eq!(style.typeface_name.as_deref(), Some("Times New Roman"));
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.font_size, Some(32.0));
        assert_eq!(style.text_color_hex.as_deref(), Some("#ff0000"));
        assert_eq!(style.text_color_class, ColorClass::Red);
        assert_eq!(style.background_color, None);
        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.letter_spacing, Spacing::Normal);
        assert_eq!(style.line_height, Spacing::Loose);
        assert_eq!(
            style.text_decoration,
            Some(vec![TextDecoration::Underline, TextDecoration::Strikethrough])
        );
        assert_eq!(style.text_transform, TextTransform::Uppercase);
    }

    #[test]
    fn test_degenerate_boxes_dropped_and_ids_renumbered() {
        let elements = normalize_dom_elements(raw(serde_json::json!([
            { "tag": "p", "text": "first", "bbox": [0.0, 0.0, 100.0, 20.0] },
            { "tag": "span", "text": "collapsed", "bbox": [10.0, 10.0, 10.0, 30.0] },
            { "tag": "img", "text": "", "bbox": [0.0, 40.0, 64.0, 104.0] },
            { "tag": "li", "text": "item", "bbox": [0.0, 120.0, 50.0, 140.0] }
        ])));

        let ids: Vec<u32> = elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(elements[1].category, Category::Picture);
        assert_eq!(elements[1].text_content, None);
        assert_eq!(elements[2].category, Category::ListItem);
    }

    #[test]
    fn test_script_uses_whitelist_selector() {
        let script = collect_script();
        assert!(script.contains("\"h1,h2,h3,h4,h5,h6,p,table,img"));
        assert!(script.contains("JSON.stringify(out)"));
    }
}
