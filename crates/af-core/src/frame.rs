use crate::color::{Rgb, luminance};

/// Grille d'échantillons produite par une source.
///
/// Flat row-major buffers: `rgb[y * width + x]` and `luma[y * width + x]`.
/// `luma` is derived from `rgb` at construction and only diverges from it
/// through `invert` or dithering.
///
/// # Example
/// ```
/// use af_core::frame::SampleGrid;
/// let grid = SampleGrid::from_rgb(2, 1, vec![(255, 255, 255), (0, 0, 0)], false);
/// assert_eq!(grid.luma, vec![255, 0]);
/// let inv = SampleGrid::from_rgb(2, 1, vec![(255, 255, 255), (0, 0, 0)], true);
/// assert_eq!(inv.luma, vec![0, 255]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleGrid {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Colors, row-major.
    pub rgb: Vec<Rgb>,
    /// Luminance per cell, row-major.
    pub luma: Vec<u8>,
}

impl SampleGrid {
    /// Build a grid from colors, deriving luminance (complemented when `invert`).
    ///
    /// # Panics
    /// Debug builds assert `rgb.len() == width * height`.
    #[must_use]
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<Rgb>, invert: bool) -> Self {
        debug_assert_eq!(rgb.len(), width as usize * height as usize);
        let luma = rgb
            .iter()
            .map(|&(r, g, b)| {
                let l = luminance(r, g, b);
                if invert { 255 - l } else { l }
            })
            .collect();
        Self {
            width,
            height,
            rgb,
            luma,
        }
    }

    /// Flat index of (x, y).
    #[inline(always)]
    #[must_use]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.luma.len()
    }

    /// True when the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.luma.is_empty()
    }
}

/// Single cell in the glyph grid.
///
/// # Example
/// ```
/// use af_core::frame::GlyphCell;
/// let cell = GlyphCell::default();
/// assert_eq!(cell.ch, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphCell {
    /// Caractère à afficher.
    pub ch: char,
    /// Index in the ramp the glyph was taken from.
    pub index: usize,
    /// Couleur de remplissage (RGB).
    pub fg: Rgb,
}

impl Default for GlyphCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            index: 0,
            fg: (0, 0, 0),
        }
    }
}

/// Grille de sortie. Owned by exactly one render.
///
/// # Example
/// ```
/// use af_core::frame::{GlyphGrid, GlyphCell};
/// let mut grid = GlyphGrid::new(80, 24);
/// grid.set(3, 2, GlyphCell { ch: '@', index: 9, fg: (255, 0, 0) });
/// assert_eq!(grid.get(3, 2).ch, '@');
/// assert_eq!(grid.rows().count(), 24);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of cells, row-major.
    pub cells: Vec<GlyphCell>,
    /// Width in characters.
    pub width: u32,
    /// Height in characters.
    pub height: u32,
}

impl GlyphGrid {
    /// Crée une grille remplie d'espaces.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![GlyphCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    /// Set a cell at column `x`, row `y`.
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, cell: GlyphCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Cell at column `x`, row `y`.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &GlyphCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, GlyphCell> {
        self.cells.chunks_exact(self.width.max(1) as usize)
    }
}

/// Final product of a render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutput {
    /// Encoded PNG.
    Image {
        /// PNG bytes.
        png: Vec<u8>,
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },
    /// Plain text, rows joined by `\n`.
    Text(String),
}

impl RenderOutput {
    /// MIME type of the payload.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image/png",
            Self::Text(_) => "text/plain; charset=utf-8",
        }
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Image { png, .. } => png,
            Self::Text(text) => text.as_bytes(),
        }
    }
}
