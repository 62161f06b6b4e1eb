//! Compositeurs de sortie : rasterisation PNG des glyphes et texte brut.

pub mod bitmap_font;
pub mod font;
pub mod rasterizer;
pub mod text;
