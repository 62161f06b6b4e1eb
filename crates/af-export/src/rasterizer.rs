use std::collections::HashMap;
use std::io::Cursor;

use af_core::config::RenderConfig;
use af_core::error::CoreError;
use af_core::frame::{GlyphGrid, RenderOutput};
use af_core::traits::Compositor;
use image::{ImageFormat, RgbImage};
use rayon::prelude::*;

use crate::font::{self, FontFace};

/// Largest canvas side accepted, in pixels.
pub const MAX_CANVAS_SIDE: u32 = 16384;

/// Glyph substituted when the font cannot draw a character.
const SUBSTITUTE: char = '?';

/// Convertit une `GlyphGrid` en PNG : un glyphe par cellule sur fond noir.
///
/// # Example
/// ```
/// use af_core::config::RenderConfig;
/// use af_core::frame::{GlyphCell, GlyphGrid, RenderOutput};
/// use af_core::traits::Compositor;
/// use af_export::font::FontFace;
/// use af_export::rasterizer::Rasterizer;
///
/// let mut grid = GlyphGrid::new(3, 2);
/// grid.set(0, 0, GlyphCell { ch: '#', index: 1, fg: (255, 255, 255) });
/// let config = RenderConfig::default();
/// let out = Rasterizer::new(FontFace::Builtin).compose(&grid, &config).unwrap();
/// assert!(matches!(out, RenderOutput::Image { width: 30, height: 36, .. }));
/// ```
pub struct Rasterizer {
    face: FontFace,
}

impl Rasterizer {
    /// Rasterizer drawing with `face`.
    #[must_use]
    pub fn new(face: FontFace) -> Self {
        Self { face }
    }

    /// Rasterizer with the font resolved from `config.font`.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        let face = font::resolve(config.font.as_deref());
        log::debug!("police : {}", face.name());
        Self::new(face)
    }

    /// Font in use.
    #[must_use]
    pub fn face(&self) -> &FontFace {
        &self.face
    }

    /// Atlas des glyphes présents dans la grille, un masque alpha par caractère.
    fn build_atlas(&self, grid: &GlyphGrid, config: &RenderConfig) -> HashMap<char, Vec<u8>> {
        let (cw, ch) = (config.char_width, config.char_height);
        let raster = |c: char| self.face.rasterize(c, config.font_size, cw, ch);

        let mut atlas = HashMap::new();
        let mut substitute: Option<Option<Vec<u8>>> = None;
        for cell in &grid.cells {
            if atlas.contains_key(&cell.ch) {
                continue;
            }
            let mask = raster(cell.ch).unwrap_or_else(|| {
                log::debug!("glyphe {:?} absent, substitué", cell.ch);
                substitute
                    .get_or_insert_with(|| raster(SUBSTITUTE))
                    .clone()
                    .unwrap_or_else(|| vec![0u8; cw as usize * ch as usize])
            });
            atlas.insert(cell.ch, mask);
        }
        atlas
    }

    /// Draw `grid` onto a black canvas of `width·char_width × height·char_height`.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] when a canvas side exceeds
    /// [`MAX_CANVAS_SIDE`].
    pub fn render(&self, grid: &GlyphGrid, config: &RenderConfig) -> Result<RgbImage, CoreError> {
        let (cw, ch) = (config.char_width, config.char_height);
        let width = grid.width.saturating_mul(cw);
        let height = grid.height.saturating_mul(ch);
        if width == 0 || height == 0 || width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            return Err(CoreError::InvalidDimensions { width, height });
        }

        let atlas = self.build_atlas(grid, config);
        let empty = vec![0u8; cw as usize * ch as usize];

        let stride = width as usize * 3;
        let band_size = stride * ch as usize;
        let mut data = vec![0u8; stride * height as usize];

        data.par_chunks_exact_mut(band_size)
            .enumerate()
            .for_each(|(gy, band)| {
                for gx in 0..grid.width {
                    let cell = grid.get(gx, gy as u32);
                    let alpha = atlas.get(&cell.ch).unwrap_or(&empty);
                    let x0 = gx as usize * cw as usize;

                    for cy in 0..ch as usize {
                        for cx in 0..cw as usize {
                            let a = alpha[cy * cw as usize + cx];
                            if a == 0 {
                                continue;
                            }
                            // Fond noir : le mélange se réduit à fg · alpha.
                            let a = f32::from(a) / 255.0;
                            let idx = cy * stride + (x0 + cx) * 3;
                            band[idx] = (f32::from(cell.fg.0) * a) as u8;
                            band[idx + 1] = (f32::from(cell.fg.1) * a) as u8;
                            band[idx + 2] = (f32::from(cell.fg.2) * a) as u8;
                        }
                    }
                }
            });

        RgbImage::from_raw(width, height, data)
            .ok_or_else(|| CoreError::Encode("canvas buffer size mismatch".into()))
    }
}

impl Compositor for Rasterizer {
    fn compose(&self, grid: &GlyphGrid, config: &RenderConfig) -> Result<RenderOutput, CoreError> {
        let canvas = self.render(grid, config)?;
        let (width, height) = canvas.dimensions();
        let png = encode_png(&canvas)?;
        log::debug!("PNG {width}x{height}, {} octets", png.len());
        Ok(RenderOutput::Image { png, width, height })
    }
}

/// Encode a canvas as PNG bytes.
///
/// # Errors
/// [`CoreError::Encode`] when the encoder fails.
pub fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, CoreError> {
    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CoreError::Encode(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::frame::GlyphCell;

    fn config(cw: u32, ch: u32, font_size: f32) -> RenderConfig {
        RenderConfig {
            char_width: cw,
            char_height: ch,
            font_size,
            ..RenderConfig::default()
        }
    }

    fn filled(w: u32, h: u32, ch: char, fg: (u8, u8, u8)) -> GlyphGrid {
        let mut grid = GlyphGrid::new(w, h);
        for cell in &mut grid.cells {
            *cell = GlyphCell { ch, index: 0, fg };
        }
        grid
    }

    #[test]
    fn canvas_matches_grid_and_cell_size() {
        let grid = filled(7, 3, '#', (255, 255, 255));
        let canvas = Rasterizer::new(FontFace::Builtin).render(&grid, &config(10, 18, 14.0)).unwrap();
        assert_eq!(canvas.dimensions(), (70, 54));
    }

    #[test]
    fn full_block_takes_the_cell_color() {
        let grid = filled(2, 2, '█', (200, 100, 50));
        let canvas = Rasterizer::new(FontFace::Builtin).render(&grid, &config(8, 8, 8.0)).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [200, 100, 50]));
    }

    #[test]
    fn spaces_leave_the_canvas_black() {
        let grid = filled(4, 4, ' ', (255, 255, 255));
        let canvas = Rasterizer::new(FontFace::Builtin).render(&grid, &config(6, 9, 9.0)).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn missing_glyph_is_substituted() {
        let cfg = config(8, 8, 8.0);
        let r = Rasterizer::new(FontFace::Builtin);
        let missing = r.render(&filled(1, 1, '中', (255, 255, 255)), &cfg).unwrap();
        let question = r.render(&filled(1, 1, '?', (255, 255, 255)), &cfg).unwrap();
        assert_eq!(missing, question);
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let grid = GlyphGrid::new(2000, 1);
        let err = Rasterizer::new(FontFace::Builtin)
            .render(&grid, &config(10, 18, 14.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { width: 20000, .. }));
    }

    #[test]
    fn compose_emits_decodable_png() {
        let grid = filled(5, 2, '@', (0, 255, 0));
        let cfg = config(10, 18, 14.0);
        let out = Rasterizer::new(FontFace::Builtin).compose(&grid, &cfg).unwrap();
        let RenderOutput::Image { png, width, height } = out else {
            panic!("expected an image");
        };
        assert_eq!((width, height), (50, 36));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 36));
    }
}
