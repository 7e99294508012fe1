//! Digital PDF support built on lopdf.
//!
//! [`PdfDocument`] wraps the object model, [`content`] interprets page
//! content streams, [`blocks`] groups the result into text and image blocks,
//! and [`PdfEngine`] turns blocks into layout elements.

pub mod blocks;
pub mod content;
mod document;
mod engine;
mod raster;

pub use document::{PageGeometry, PdfDocument};
pub use engine::{PdfEngine, TITLE_SIZE_THRESHOLD};
pub use raster::first_page_raster;
