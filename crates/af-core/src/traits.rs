use crate::config::RenderConfig;
use crate::error::CoreError;
use crate::frame::{GlyphGrid, RenderOutput, SampleGrid};

/// Fournit la grille d'échantillons au pipeline.
///
/// Implémenté par : `ImageSource`, `ProceduralSource`.
///
/// # Example
/// ```
/// use af_core::traits::Source;
/// use af_core::frame::SampleGrid;
/// use af_core::config::RenderConfig;
/// use af_core::CoreError;
///
/// struct Flat;
/// impl Source for Flat {
///     fn sample(&self, _config: &RenderConfig, _rng: &mut fastrand::Rng)
///         -> Result<SampleGrid, CoreError> {
///         Ok(SampleGrid::from_rgb(1, 1, vec![(9, 9, 9)], false))
///     }
///     fn name(&self) -> &'static str { "flat" }
/// }
/// ```
pub trait Source {
    /// Produit la grille `target_w × target_h` pour cette configuration.
    ///
    /// `rng` is the render's own stream; sources that are not stochastic ignore it.
    ///
    /// # Errors
    /// Input errors (undecodable data, invalid dimensions).
    fn sample(
        &self,
        config: &RenderConfig,
        rng: &mut fastrand::Rng,
    ) -> Result<SampleGrid, CoreError>;

    /// Nom lisible pour les logs.
    fn name(&self) -> &'static str;
}

/// Turns a finished glyph grid into the output payload.
pub trait Compositor {
    /// Render `grid`.
    ///
    /// # Errors
    /// Encoding failures or canvas dimensions out of range. Single glyph
    /// failures are substituted and never surface here.
    fn compose(&self, grid: &GlyphGrid, config: &RenderConfig) -> Result<RenderOutput, CoreError>;
}
