//! JSON serialization for layout documents.

use crate::error::Result;
use crate::model::LayoutDocument;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &LayoutDocument, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
        JsonFormat::Compact => serde_json::to_string(doc)?,
    };
    Ok(json)
}

/// Parse a document from JSON. Bounding boxes are validated while parsing.
pub fn from_json(json: &str) -> Result<LayoutDocument> {
    Ok(serde_json::from_str(json)?)
}

impl LayoutDocument {
    /// Serialize to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        from_json(json)
    }
}
