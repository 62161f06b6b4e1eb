use af_core::charset::Ramp;
use af_core::config::{DitherMode, RenderConfig};
use af_core::frame::{GlyphGrid, SampleGrid};
use rayon::prelude::*;

use crate::color_map::map_color;
use crate::dither;
use crate::selector::{GlyphSelector, sample_coord};

/// Orchestre échantillons → glyphes : diffusion, sélection, tramage, couleur.
///
/// # Example
/// ```
/// use af_ascii::mapper::GlyphMapper;
/// use af_core::config::RenderConfig;
/// use af_core::frame::SampleGrid;
///
/// let config = RenderConfig { charset: Some(" #".into()), ..RenderConfig::default() };
/// let mapper = GlyphMapper::new(config.ramp().unwrap(), &config);
/// let samples = SampleGrid::from_rgb(2, 1, vec![(0, 0, 0), (255, 255, 255)], false);
/// let grid = mapper.map(&samples, &config, &mut fastrand::Rng::with_seed(0));
/// assert_eq!(grid.get(0, 0).ch, ' ');
/// assert_eq!(grid.get(1, 0).ch, '#');
/// ```
pub struct GlyphMapper {
    ramp: Ramp,
    selector: GlyphSelector,
}

impl GlyphMapper {
    /// Build the mapper for one ramp and diversity setting.
    #[must_use]
    pub fn new(ramp: Ramp, config: &RenderConfig) -> Self {
        let selector = GlyphSelector::new(&ramp, config.diversity);
        Self { ramp, selector }
    }

    /// Ramp glyphs are taken from.
    #[must_use]
    pub fn ramp(&self) -> &Ramp {
        &self.ramp
    }

    /// Convert a sample grid into a glyph grid of the same dimensions.
    ///
    /// Random draws happen in a fixed order (row-major jitter and diversity,
    /// then the ordered dither pass) so a seeded stream gives identical grids.
    pub fn map(&self, samples: &SampleGrid, config: &RenderConfig, rng: &mut fastrand::Rng) -> GlyphGrid {
        let (w, h) = (samples.width, samples.height);
        let mut grid = GlyphGrid::new(w, h);
        if samples.is_empty() {
            return grid;
        }

        // 1. Floyd–Steinberg sur une copie de la luminance.
        let mut luma = samples.luma.clone();
        if config.dither == DitherMode::ErrorDiffusion {
            let stats = dither::floyd_steinberg(&mut luma, w, h);
            log::debug!(
                "diffusion: introduced {:.1}, distributed {:.1}, dropped {:.1}",
                stats.introduced,
                stats.distributed,
                stats.dropped
            );
        }

        // 2. Sélection séquentielle : l'ordre des tirages doit rester stable.
        let mut sources = Vec::with_capacity(samples.len());
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            let x = (i % w as usize) as u32;
            let y = (i / w as usize) as u32;
            let (sx, sy) = sample_coord(x, y, w, h, config.sample_method, rng);
            let src = samples.offset(sx, sy);
            let index = self.selector.select(luma[src], rng);
            cell.index = index;
            cell.ch = self.ramp.glyph(index);
            sources.push(src);
        }

        // 3. Tramage ordonné sur les index.
        if config.dither == DitherMode::Ordered {
            let nudged = dither::apply_ordered(&mut grid, &self.ramp, config.dither_strength, rng);
            log::debug!("ordered dither: {nudged} cell(s) nudged");
        }

        // 4. Couleur, indépendante par cellule.
        grid.cells
            .par_iter_mut()
            .zip(sources.par_iter())
            .for_each(|(cell, &src)| {
                cell.fg = map_color(samples.rgb[src], config.color_mode, &config.palette);
            });

        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::config::{ColorMode, SampleMethod};

    fn gradient(w: u32, h: u32) -> SampleGrid {
        let rgb = (0..w * h)
            .map(|i| {
                let v = ((i % w) * 255 / (w - 1).max(1)) as u8;
                (v, v / 2, 255 - v)
            })
            .collect();
        SampleGrid::from_rgb(w, h, rgb, false)
    }

    fn run(config: &RenderConfig, seed: u64) -> GlyphGrid {
        let mapper = GlyphMapper::new(config.ramp().unwrap(), config);
        mapper.map(&gradient(24, 6), config, &mut fastrand::Rng::with_seed(seed))
    }

    #[test]
    fn grid_matches_sample_dimensions() {
        let grid = run(&RenderConfig::default(), 0);
        assert_eq!((grid.width, grid.height), (24, 6));
        assert_eq!(grid.cells.len(), 24 * 6);
    }

    #[test]
    fn plain_mapping_follows_luminance() {
        let config = RenderConfig { color_mode: ColorMode::Rgb, ..RenderConfig::default() };
        let grid = run(&config, 0);
        for row in grid.rows() {
            for pair in row.windows(2) {
                assert!(pair[0].index <= pair[1].index);
            }
        }
        // Color comes from the sample untouched.
        assert_eq!(grid.get(0, 0).fg, (0, 0, 255));
    }

    #[test]
    fn seeded_runs_are_identical_with_every_stochastic_stage() {
        let config = RenderConfig {
            diversity: 0.2,
            sample_method: SampleMethod::Random,
            dither: DitherMode::Ordered,
            dither_strength: 1.0,
            ..RenderConfig::default()
        };
        assert_eq!(run(&config, 99), run(&config, 99));
    }

    #[test]
    fn error_diffusion_uses_ramp_extremes() {
        let config = RenderConfig {
            dither: DitherMode::ErrorDiffusion,
            charset: Some(" .:#".into()),
            ..RenderConfig::default()
        };
        let grid = run(&config, 0);
        assert!(grid.cells.iter().all(|c| c.ch == ' ' || c.ch == '#'));
        assert!(grid.cells.iter().any(|c| c.ch == '#'));
    }

    #[test]
    fn grayscale_color_uses_sample_luminance() {
        let config = RenderConfig { color_mode: ColorMode::Grayscale, ..RenderConfig::default() };
        let samples = SampleGrid::from_rgb(1, 1, vec![(255, 0, 0)], false);
        let mapper = GlyphMapper::new(config.ramp().unwrap(), &config);
        let grid = mapper.map(&samples, &config, &mut fastrand::Rng::with_seed(0));
        assert_eq!(grid.get(0, 0).fg, (76, 76, 76));
    }

    #[test]
    fn invert_changes_glyphs_not_grayscale_color() {
        let config = RenderConfig {
            color_mode: ColorMode::Grayscale,
            charset: Some(" #".into()),
            ..RenderConfig::default()
        };
        let mapper = GlyphMapper::new(config.ramp().unwrap(), &config);
        let map = |invert| {
            let samples = SampleGrid::from_rgb(1, 1, vec![(255, 255, 255)], invert);
            *mapper.map(&samples, &config, &mut fastrand::Rng::with_seed(0)).get(0, 0)
        };
        let (plain, inverted) = (map(false), map(true));
        assert_eq!((plain.ch, inverted.ch), ('#', ' '));
        assert_eq!(plain.fg, (255, 255, 255));
        assert_eq!(inverted.fg, (255, 255, 255));
    }
}
