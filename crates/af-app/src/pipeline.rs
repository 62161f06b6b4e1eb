use std::io::Write;
use std::time::Instant;

use af_ascii::mapper::GlyphMapper;
use af_core::config::{OutputMode, RenderConfig};
use af_core::error::CoreError;
use af_core::frame::{GlyphGrid, RenderOutput};
use af_core::traits::{Compositor, Source};
use af_export::rasterizer::Rasterizer;
use af_export::text::TextCompositor;
use af_source::image::ImageSource;

/// What a render draws from.
#[derive(Clone, Debug)]
pub enum RenderInput {
    /// Encoded image (PNG, JPEG, BMP, GIF).
    ImageBytes(Vec<u8>),
    /// Procedural pattern, style taken from [`RenderConfig::style`].
    Procedural,
}

/// Un rendu complet : source → sélection → tramage → composition.
///
/// Each call owns its sample grid, glyph grid and random stream; concurrent
/// calls share nothing mutable.
///
/// # Errors
/// Input errors (undecodable bytes, invalid configuration, oversize grid) and
/// encoding failures, as [`CoreError`].
///
/// # Example
/// ```
/// use af_app::pipeline::{render, RenderInput};
/// use af_core::config::{OutputMode, RenderConfig};
/// use af_core::frame::RenderOutput;
///
/// let config = RenderConfig {
///     output_mode: OutputMode::Text,
///     target_width: 8,
///     target_height: 3,
///     seed: Some(1),
///     ..RenderConfig::default()
/// };
/// let RenderOutput::Text(text) = render(RenderInput::Procedural, &config).unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(text.lines().count(), 3);
/// ```
pub fn render(input: RenderInput, config: &RenderConfig) -> Result<RenderOutput, CoreError> {
    let started = Instant::now();
    config.validate()?;

    let source = open_source(input)?;
    let grid = glyph_grid(source.as_ref(), config)?;
    log::info!(
        "rendu {} : grille {}x{}, sortie {:?}",
        source.name(),
        grid.width,
        grid.height,
        config.output_mode
    );

    let output = compositor(config).compose(&grid, config)?;
    log::info!(
        "rendu terminé en {:.1} ms ({} octets)",
        started.elapsed().as_secs_f64() * 1000.0,
        output.as_bytes().len()
    );
    Ok(output)
}

/// Stages up to the glyph grid, without composition.
///
/// # Errors
/// As [`render`], minus encoding.
pub fn glyph_grid(source: &dyn Source, config: &RenderConfig) -> Result<GlyphGrid, CoreError> {
    let ramp = config.ramp()?;
    let mut rng = config.rng();

    let samples = source.sample(config, &mut rng)?;
    log::debug!("échantillons {}x{} ({})", samples.width, samples.height, source.name());

    let mapper = GlyphMapper::new(ramp, config);
    Ok(mapper.map(&samples, config, &mut rng))
}

fn open_source(input: RenderInput) -> Result<Box<dyn Source>, CoreError> {
    match input {
        RenderInput::ImageBytes(bytes) => Ok(Box::new(ImageSource::from_bytes(&bytes)?)),
        RenderInput::Procedural => procedural_source(),
    }
}

/// Écrit la sortie telle quelle : mêmes octets que le fichier `--output`.
///
/// # Errors
/// Write or flush failure on `out`.
pub fn emit(out: &mut impl Write, output: &RenderOutput) -> std::io::Result<()> {
    out.write_all(output.as_bytes())?;
    out.flush()
}

#[cfg(feature = "procedural")]
fn procedural_source() -> Result<Box<dyn Source>, CoreError> {
    Ok(Box::new(af_source::procedural::ProceduralSource))
}

#[cfg(not(feature = "procedural"))]
fn procedural_source() -> Result<Box<dyn Source>, CoreError> {
    Err(CoreError::InvalidValue {
        field: "style",
        reason: "built without the `procedural` feature".into(),
    })
}

fn compositor(config: &RenderConfig) -> Box<dyn Compositor> {
    match config.output_mode {
        OutputMode::Image => Box::new(Rasterizer::from_config(config)),
        OutputMode::Text => Box::new(TextCompositor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_runs_before_decoding() {
        let config = RenderConfig {
            scale: 0.0,
            ..RenderConfig::default()
        };
        let err = render(RenderInput::ImageBytes(b"junk".to_vec()), &config).unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { field: "scale", .. }));
    }

    #[test]
    fn undecodable_bytes_are_an_input_error() {
        let err = render(RenderInput::ImageBytes(vec![0, 1, 2, 3]), &RenderConfig::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidImage(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn emitted_text_has_no_trailing_newline() {
        let output = RenderOutput::Text("ab\ncd".into());
        let mut out = Vec::new();
        emit(&mut out, &output).unwrap();
        assert_eq!(out, b"ab\ncd");
        assert_eq!(out, output.as_bytes());
    }

    #[cfg(feature = "procedural")]
    #[test]
    fn procedural_grid_uses_target_size() {
        let config = RenderConfig {
            target_width: 17,
            target_height: 9,
            seed: Some(3),
            ..RenderConfig::default()
        };
        let grid = glyph_grid(&af_source::procedural::ProceduralSource, &config).unwrap();
        assert_eq!((grid.width, grid.height), (17, 9));
    }
}
