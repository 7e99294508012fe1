//! Style inference from a vision-language model.
//!
//! The vision engine hands a client a Set-of-Mark overlay (every detected
//! element outlined and tagged with its id) plus the list of ids, and gets
//! back a style per id. Model output is untrusted: every field is validated
//! against the closed vocabularies in [`crate::model`].

use std::collections::HashMap;

use image::DynamicImage;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::model::{
    Alignment, ColorClass, FontCategory, FontStyle, FontWeight, LayoutStyle, Spacing,
    TextDecoration, TextTransform,
};
use crate::style::{classify_color, css_color_to_hex};

/// Infers per-element styles from an annotated image.
pub trait StyleInference {
    /// Return a style for each id the model could analyse. Ids may be
    /// missing from the result; the caller leaves those elements unstyled.
    fn extract_styles(
        &self,
        image: &DynamicImage,
        ids: &[u32],
    ) -> Result<HashMap<u32, LayoutStyle>>;
}

/// Build the instruction sent alongside the overlay image.
pub fn style_prompt(ids: &[u32]) -> String {
    let ids = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r##"Analyze this document image with numbered green ID tags marking text elements.

For each of these element IDs: [{ids}]

Extract the visual typography style by examining the text appearance at each numbered marker.

Focus on:
- Font category (serif, sans, mono, handwritten, display)
- Font weight (thin, light, normal, medium, semibold, bold, extrabold, black)
- Text color
- Alignment if discernible

Respond with JSON of the form:
{{"elements": {{"<id>": {{"font_category": "...", "typeface_name": "...", "font_weight": "...", "font_style": "normal|italic|oblique", "font_size": 12, "text_color_hex": "#rrggbb", "text_color_class": "black|gray|white|red|blue|green|yellow|orange|purple|other", "background_color": "#rrggbb", "alignment": "left|center|right|justify"}}}}}}

Use "unknown" for anything you cannot determine. Return styles for ALL requested IDs."##
    )
}

/// Pull a JSON object out of model text, tolerating markdown fences and
/// surrounding prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }

    if let Some(start) = text.find("```") {
        let block = &text[start + 3..];
        let content = block.find('\n').map_or(block, |i| &block[i + 1..]);
        if let Some(end) = content.find("```") {
            return Some(content[..end].trim());
        }
    }

    let start = text.find(['{', '['])?;
    let end = text.rfind(['}', ']'])?;
    (end > start).then(|| &text[start..=end])
}

/// Validate a model response into styles keyed by element id.
///
/// Accepts `{"elements": {"1": {...}}}`, a bare `{"1": {...}}` map, or an
/// array of style objects each carrying an `id`. Entries with malformed ids
/// are skipped with a warning.
pub fn parse_style_response(response: &Value) -> HashMap<u32, LayoutStyle> {
    let root = match response {
        Value::Object(obj) => obj.get("elements").unwrap_or(response),
        _ => response,
    };

    let mut styles = HashMap::new();
    match root {
        Value::Object(map) => {
            for (key, value) in map {
                let Some(id) = parse_id_str(key) else {
                    log::warn!("Ignoring style for malformed element id {:?}", key);
                    continue;
                };
                match value.as_object() {
                    Some(fields) => {
                        styles.insert(id, parse_style(fields));
                    }
                    None => log::warn!("Style for element {} is not an object", id),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let Some(fields) = item.as_object() else {
                    log::warn!("Ignoring non-object style entry");
                    continue;
                };
                match fields.get("id").and_then(parse_id) {
                    Some(id) => {
                        styles.insert(id, parse_style(fields));
                    }
                    None => log::warn!("Ignoring style entry without a valid id"),
                }
            }
        }
        _ => log::warn!("Style response is neither an object nor an array"),
    }
    styles
}

fn parse_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => parse_id_str(s),
        _ => None,
    }
}

fn parse_id_str(s: &str) -> Option<u32> {
    s.trim().trim_start_matches('#').parse().ok()
}

fn label<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str).map(str::trim)
}

fn parse_style(fields: &Map<String, Value>) -> LayoutStyle {
    let vocab = |key: &str| label(fields, key).unwrap_or("unknown");

    let text_color_hex = label(fields, "text_color_hex").and_then(css_color_to_hex);
    let text_color_class = match ColorClass::from_label_or_unknown(vocab("text_color_class")) {
        ColorClass::Unknown if text_color_hex.is_some() => {
            classify_color(text_color_hex.as_deref())
        }
        class => class,
    };

    let text_decoration = match fields.get("text_decoration") {
        Some(Value::Array(items)) => {
            let decorations: Vec<TextDecoration> = items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(TextDecoration::from_label)
                .collect();
            Some(decorations).filter(|d| !d.is_empty())
        }
        Some(Value::String(s)) => {
            let decorations: Vec<TextDecoration> = s
                .split([' ', ','])
                .filter_map(TextDecoration::from_label)
                .collect();
            Some(decorations).filter(|d| !d.is_empty())
        }
        _ => None,
    };

    LayoutStyle {
        font_category: FontCategory::from_label_or_unknown(vocab("font_category")),
        typeface_name: label(fields, "typeface_name")
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("unknown"))
            .map(String::from),
        font_weight: FontWeight::from_label_or_unknown(vocab("font_weight")),
        font_style: FontStyle::from_label_or_unknown(vocab("font_style")),
        font_size: fields
            .get("font_size")
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .filter(|v| v.is_finite() && *v > 0.0),
        text_color_hex,
        text_color_class,
        background_color: label(fields, "background_color").and_then(css_color_to_hex),
        alignment: Alignment::from_label_or_unknown(vocab("alignment")),
        letter_spacing: Spacing::from_label_or_unknown(vocab("letter_spacing")),
        line_height: Spacing::from_label_or_unknown(vocab("line_height")),
        text_decoration,
        text_transform: TextTransform::from_label_or_unknown(vocab("text_transform")),
    }
}

#[cfg(feature = "vlm")]
pub use gemini::GeminiClient;

#[cfg(feature = "vlm")]
mod gemini {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::time::Duration;

    use base64::Engine;
    use image::{DynamicImage, ImageFormat};
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use serde_json::json;

    use super::{extract_json_object, parse_style_response, style_prompt, StyleInference};
    use crate::error::{Error, Result};
    use crate::model::LayoutStyle;

    const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

    #[derive(Debug, Deserialize)]
    struct GenerateResponse {
        #[serde(default)]
        candidates: Vec<Candidate>,
    }

    #[derive(Debug, Deserialize)]
    struct Candidate {
        content: Option<Content>,
    }

    #[derive(Debug, Deserialize)]
    struct Content {
        #[serde(default)]
        parts: Vec<Part>,
    }

    #[derive(Debug, Deserialize)]
    struct Part {
        text: Option<String>,
    }

    /// Gemini `generateContent` client. One blocking request per call, no retries.
    pub struct GeminiClient {
        http: Client,
        api_key: String,
        model: String,
    }

    impl GeminiClient {
        /// Model used when none is configured.
        pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

        /// Create a client for the default model.
        pub fn new(api_key: impl Into<String>) -> Result<Self> {
            let http = Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .map_err(|e| Error::StyleInference(format!("failed to create HTTP client: {}", e)))?;
            Ok(Self {
                http,
                api_key: api_key.into(),
                model: Self::DEFAULT_MODEL.to_string(),
            })
        }

        /// Use a different model.
        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }

        /// The configured model name.
        pub fn model(&self) -> &str {
            &self.model
        }
    }

    impl StyleInference for GeminiClient {
        fn extract_styles(
            &self,
            image: &DynamicImage,
            ids: &[u32],
        ) -> Result<HashMap<u32, LayoutStyle>> {
            let mut png = Cursor::new(Vec::new());
            image.write_to(&mut png, ImageFormat::Png)?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(png.get_ref());

            let body = json!({
                "contents": [{
                    "parts": [
                        { "text": style_prompt(ids) },
                        { "inlineData": { "mimeType": "image/png", "data": encoded } }
                    ]
                }],
                "generationConfig": { "responseMimeType": "application/json" }
            });

            log::info!("Calling Gemini API ({})", self.model);
            let url = format!("{}/models/{}:generateContent", API_BASE, self.model);
            let response = self
                .http
                .post(url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .map_err(|e| Error::StyleInference(format!("request failed: {}", e)))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().unwrap_or_default();
                return Err(Error::StyleInference(format!(
                    "API returned {}: {}",
                    status, detail
                )));
            }

            let parsed: GenerateResponse = response
                .json()
                .map_err(|e| Error::StyleInference(format!("invalid response body: {}", e)))?;
            let text: String = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();

            let json = extract_json_object(&text)
                .ok_or_else(|| Error::StyleInference("no JSON in model response".to_string()))?;
            let value: serde_json::Value = serde_json::from_str(json)
                .map_err(|e| Error::StyleInference(format!("malformed JSON: {}", e)))?;

            let styles = parse_style_response(&value);
            log::info!("Received styles for {} elements", styles.len());
            Ok(styles)
        }
    }
}
