//! Layout model types.
//!
//! Every engine converges on these types. A `LayoutDocument` is built
//! fresh for each processed file and owned by the caller afterwards.

mod document;
mod element;
mod page;
mod style;

pub use document::{LayoutDocument, LayoutMetadata, OriginType};
pub use element::{BBox, Category, LayoutElement};
pub use page::LayoutPage;
pub use style::{
    Alignment, ColorClass, FontCategory, FontStyle, FontWeight, LayoutStyle, Spacing,
    TextDecoration, TextTransform,
};
