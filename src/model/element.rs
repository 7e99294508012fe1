//! Layout elements and their geometry.

use super::LayoutStyle;
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box `(x_min, y_min, x_max, y_max)` with a top-left origin.
///
/// A `BBox` always has positive area; constructors reject degenerate boxes.
/// Serializes as a 4-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    x_min: f32,
    y_min: f32,
    x_max: f32,
    y_max: f32,
}

impl BBox {
    /// Create a bounding box from its corners.
    ///
    /// Returns `None` when the box is degenerate, inverted or not finite.
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Option<Self> {
        let finite = [x_min, y_min, x_max, y_max].iter().all(|v| v.is_finite());
        if finite && x_min < x_max && y_min < y_max {
            Some(Self {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Create a bounding box from an origin and a size.
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        Self::new(x, y, x + width, y + height)
    }

    pub fn x_min(&self) -> f32 {
        self.x_min
    }

    pub fn y_min(&self) -> f32 {
        self.y_min
    }

    pub fn x_max(&self) -> f32 {
        self.x_max
    }

    pub fn y_max(&self) -> f32 {
        self.y_max
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Corners as an array.
    pub fn to_array(&self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Clip the box to `[0, width] x [0, height]`.
    ///
    /// Returns `None` if nothing of the box remains inside.
    pub fn clamp_to(&self, width: f32, height: f32) -> Option<BBox> {
        BBox::new(
            self.x_min.max(0.0),
            self.y_min.max(0.0),
            self.x_max.min(width),
            self.y_max.min(height),
        )
    }
}

impl TryFrom<[f32; 4]> for BBox {
    type Error = Error;

    fn try_from(v: [f32; 4]) -> Result<Self, Self::Error> {
        BBox::new(v[0], v[1], v[2], v[3]).ok_or_else(|| Error::InvalidBBox(format!("{:?}", v)))
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

/// Structural role of a layout element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Title,
    Text,
    #[serde(rename = "List-item")]
    ListItem,
    Table,
    Picture,
    Caption,
    Header,
    Footer,
    Footnote,
    Code,
    Formula,
}

impl Category {
    /// The serialized label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Title => "Title",
            Category::Text => "Text",
            Category::ListItem => "List-item",
            Category::Table => "Table",
            Category::Picture => "Picture",
            Category::Caption => "Caption",
            Category::Header => "Header",
            Category::Footer => "Footer",
            Category::Footnote => "Footnote",
            Category::Code => "Code",
            Category::Formula => "Formula",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected region of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    /// Document-wide id, 1-based and increasing in document order
    pub id: u32,

    /// Structural role
    pub category: Category,

    /// Page-local bounding box
    pub bbox: BBox,

    /// Detection confidence in `[0, 1]`
    pub confidence: f32,

    /// Text content, if any
    #[serde(default)]
    pub text_content: Option<String>,

    /// Visual style, if known
    #[serde(default)]
    pub style: Option<LayoutStyle>,
}

impl LayoutElement {
    /// Create an element from a deterministic engine (confidence 1.0).
    pub fn new(id: u32, category: Category, bbox: BBox) -> Self {
        Self {
            id,
            category,
            bbox,
            confidence: 1.0,
            text_content: None,
            style: None,
        }
    }

    /// Set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Set the confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Whether the element carries non-blank text.
    pub fn has_text(&self) -> bool {
        self.text_content
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}
