//! Rendering of layout results: JSON output, Set-of-Mark overlays and debug
//! artifacts.

pub mod debug;
mod font;
mod json;
mod overlay;

pub use debug::{write_debug_artifacts, DebugArtifacts};
pub use json::{from_json, to_json, JsonFormat};
pub use overlay::draw_som_overlay;
