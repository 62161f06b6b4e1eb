/// Configuration, types, and shared structures for asciiforge.
///
/// This crate contains the shared types, traits, and configuration logic
/// used across the workspace: ramps, sample and glyph grids, the render
/// configuration and the error taxonomy.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use charset::{LuminanceLut, Ramp};
pub use config::RenderConfig;
pub use error::{CoreError, ErrorResponse};
pub use frame::{GlyphCell, GlyphGrid, RenderOutput, SampleGrid};
