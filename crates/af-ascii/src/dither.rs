//! Tramage : Bayer ordonné (après sélection) et Floyd–Steinberg (avant sélection).

use af_core::charset::Ramp;
use af_core::frame::GlyphGrid;

/// Matrice de Bayer 4x4. Normalisée sur 16 niveaux (0-15).
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Binarization threshold for error diffusion.
const THRESHOLD: f32 = 128.0;

/// Bayer threshold at (x, y), in [0, 1).
#[inline(always)]
#[must_use]
pub fn bayer_threshold(x: u32, y: u32) -> f32 {
    f32::from(BAYER_4X4[(y % 4) as usize][(x % 4) as usize]) / 16.0
}

/// Tramage ordonné sur les index de glyphes déjà choisis.
///
/// Each cell is nudged by ±1 ramp step with probability
/// `bayer_threshold · strength`, direction uniform, clamped to the ramp.
/// Returns the number of nudged cells.
///
/// # Example
/// ```
/// use af_ascii::dither::apply_ordered;
/// use af_core::charset::Ramp;
/// use af_core::frame::GlyphGrid;
///
/// let ramp = Ramp::new(" .#").unwrap();
/// let mut grid = GlyphGrid::new(4, 4);
/// let mut rng = fastrand::Rng::with_seed(1);
/// // Strength 0 never nudges.
/// assert_eq!(apply_ordered(&mut grid, &ramp, 0.0, &mut rng), 0);
/// ```
pub fn apply_ordered(
    grid: &mut GlyphGrid,
    ramp: &Ramp,
    strength: f32,
    rng: &mut fastrand::Rng,
) -> usize {
    let width = grid.width.max(1);
    let max = ramp.max_index();
    let mut nudged = 0;

    for (i, cell) in grid.cells.iter_mut().enumerate() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        if rng.f32() >= bayer_threshold(x, y) * strength {
            continue;
        }
        let index = if rng.bool() {
            (cell.index + 1).min(max)
        } else {
            cell.index.saturating_sub(1)
        };
        if index != cell.index {
            cell.index = index;
            cell.ch = ramp.glyph(index);
            nudged += 1;
        }
    }
    nudged
}

/// Bilan d'erreur d'une passe Floyd–Steinberg (valeurs absolues).
///
/// `introduced == distributed + dropped` up to float rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiffusionStats {
    /// Total quantization residual.
    pub introduced: f64,
    /// Share pushed onto in-bounds neighbours.
    pub distributed: f64,
    /// Share lost off the grid edges.
    pub dropped: f64,
}

/// Floyd–Steinberg, in place, single row-major pass.
///
/// Every cell ends at 0 or 255. Residuals spread 7/16 right, 3/16 below-left,
/// 5/16 below, 1/16 below-right; shares landing outside the grid are dropped.
///
/// # Example
/// ```
/// use af_ascii::dither::floyd_steinberg;
/// let mut luma = vec![100u8; 16];
/// let stats = floyd_steinberg(&mut luma, 4, 4);
/// assert!(luma.iter().all(|&v| v == 0 || v == 255));
/// assert!((stats.introduced - stats.distributed - stats.dropped).abs() < 1e-3);
/// ```
pub fn floyd_steinberg(luma: &mut [u8], width: u32, height: u32) -> DiffusionStats {
    let (w, h) = (width as usize, height as usize);
    debug_assert_eq!(luma.len(), w * h);

    // f32: pas de perte d'erreur par arrondi entier.
    let mut buffer: Vec<f32> = luma.iter().map(|&v| f32::from(v)).collect();
    let mut stats = DiffusionStats::default();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let old = buffer[i];
            let new = if old >= THRESHOLD { 255.0 } else { 0.0 };
            let err = old - new;
            buffer[i] = new;
            luma[i] = new as u8;
            if err == 0.0 {
                continue;
            }
            stats.introduced += f64::from(err.abs());

            let shares = [
                (x + 1 < w, 0isize, 1isize, 7.0),
                (x > 0 && y + 1 < h, 1, -1, 3.0),
                (y + 1 < h, 1, 0, 5.0),
                (x + 1 < w && y + 1 < h, 1, 1, 1.0),
            ];
            for (inside, dy, dx, weight) in shares {
                let share = err * weight / 16.0;
                if inside {
                    let j = (i as isize + dy * w as isize + dx) as usize;
                    buffer[j] += share;
                    stats.distributed += f64::from(share.abs());
                } else {
                    stats.dropped += f64::from(share.abs());
                }
            }
        }
    }
    stats
}
