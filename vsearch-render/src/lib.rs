pub mod geometry;
pub mod render;
pub mod text;

pub use geometry::DisplayGeometry;
pub use render::{CanvasStyle, SkiaRenderer};
pub use text::load_font;

pub use ab_glyph::FontVec;
