//! Visual style attributes and their closed vocabularies.

use serde::{Deserialize, Serialize};

/// Declares a closed, string-labelled vocabulary with an `Unknown` fallback.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
            /// Not determined
            #[default]
            #[serde(rename = "unknown")]
            Unknown,
        }

        impl $name {
            /// Every known label, excluding `unknown`.
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// The serialized label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unknown => "unknown",
                }
            }

            /// Parse a label (case-insensitive). Returns `None` for labels
            /// outside the vocabulary.
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim().to_ascii_lowercase();
                match label.as_str() {
                    $($label => Some($name::$variant),)+
                    "unknown" => Some($name::Unknown),
                    _ => None,
                }
            }

            /// Parse a label, falling back to `Unknown`.
            pub fn from_label_or_unknown(label: &str) -> Self {
                Self::from_label(label).unwrap_or_default()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// General category of a font family.
    FontCategory {
        Serif => "serif",
        Sans => "sans",
        Mono => "mono",
        Handwritten => "handwritten",
        Display => "display",
    }
}

vocabulary! {
    /// Visual weight of a font.
    FontWeight {
        Thin => "thin",
        Light => "light",
        Normal => "normal",
        Medium => "medium",
        Semibold => "semibold",
        Bold => "bold",
        Extrabold => "extrabold",
        Black => "black",
    }
}

vocabulary! {
    /// Slant of a font.
    FontStyle {
        Normal => "normal",
        Italic => "italic",
        Oblique => "oblique",
    }
}

vocabulary! {
    /// Semantic color bucket.
    ColorClass {
        Black => "black",
        Gray => "gray",
        White => "white",
        Red => "red",
        Blue => "blue",
        Green => "green",
        Yellow => "yellow",
        Orange => "orange",
        Purple => "purple",
        Other => "other",
    }
}

vocabulary! {
    /// Horizontal text alignment.
    Alignment {
        Left => "left",
        Center => "center",
        Right => "right",
        Justify => "justify",
    }
}

vocabulary! {
    /// Relative letter spacing or line height.
    Spacing {
        Tight => "tight",
        Normal => "normal",
        Loose => "loose",
    }
}

vocabulary! {
    /// Text case transformation.
    TextTransform {
        Uppercase => "uppercase",
        Lowercase => "lowercase",
        Capitalize => "capitalize",
        Normal => "normal",
    }
}

/// A text decoration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    Underline,
    Strikethrough,
    Overline,
}

impl TextDecoration {
    /// Parse a decoration label. `line-through` is accepted for strikethrough.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "underline" => Some(TextDecoration::Underline),
            "strikethrough" | "line-through" => Some(TextDecoration::Strikethrough),
            "overline" => Some(TextDecoration::Overline),
            _ => None,
        }
    }
}

/// Visual style attributes for a layout element.
///
/// Produced from computed CSS (DOM engine), font dictionaries (PDF engine)
/// or a style-inference model (Vision engine).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStyle {
    /// General category of the font family
    #[serde(default)]
    pub font_category: FontCategory,

    /// Specific typeface (e.g., "Helvetica-Bold", "Times New Roman")
    #[serde(default)]
    pub typeface_name: Option<String>,

    /// Visual weight
    #[serde(default)]
    pub font_weight: FontWeight,

    /// Slant
    #[serde(default)]
    pub font_style: FontStyle,

    /// Font size in points (approximate for vision)
    #[serde(default)]
    pub font_size: Option<f32>,

    /// Text color as `#rrggbb`
    #[serde(default)]
    pub text_color_hex: Option<String>,

    /// Semantic bucket of the text color
    #[serde(default)]
    pub text_color_class: ColorClass,

    /// Background color as `#rrggbb`
    #[serde(default)]
    pub background_color: Option<String>,

    /// Horizontal alignment
    #[serde(default)]
    pub alignment: Alignment,

    /// Letter spacing / tracking
    #[serde(default)]
    pub letter_spacing: Spacing,

    /// Line height / leading
    #[serde(default)]
    pub line_height: Spacing,

    /// Decorations present, if any
    #[serde(default)]
    pub text_decoration: Option<Vec<TextDecoration>>,

    /// Case transformation
    #[serde(default)]
    pub text_transform: TextTransform,
}

impl LayoutStyle {
    /// Create an empty style with every attribute unknown.
    pub fn new() -> Self {
        Self::default()
    }
}
