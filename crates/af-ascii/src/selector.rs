use af_core::charset::{LuminanceLut, Ramp};
use af_core::config::SampleMethod;

/// Luminance → ramp index, with optional Gaussian diversity.
///
/// With diversity 0 the mapping is the plain LUT and is monotonically
/// non-decreasing in luminance. With diversity > 0 the index is drawn from a
/// Gaussian window around the LUT index: texture instead of flat bands, at the
/// cost of strict monotonic fidelity.
///
/// # Example
/// ```
/// use af_ascii::selector::GlyphSelector;
/// use af_core::charset::Ramp;
///
/// let ramp = Ramp::new(" .:#@").unwrap();
/// let selector = GlyphSelector::new(&ramp, 0.0);
/// let mut rng = fastrand::Rng::with_seed(1);
/// assert_eq!(selector.select(0, &mut rng), 0);
/// assert_eq!(selector.select(255, &mut rng), 4);
/// ```
pub struct GlyphSelector {
    lut: LuminanceLut,
    max_index: usize,
    spread: usize,
    /// Largest offset a window can actually reach: `min(spread, len − 1)`.
    reach: usize,
    /// Gaussian weight for offsets `-reach..=reach`, indexed by `offset + reach`.
    weights: Vec<f64>,
}

impl GlyphSelector {
    /// Build a selector for `ramp`. `diversity` ≤ 0 disables perturbation.
    #[must_use]
    pub fn new(ramp: &Ramp, diversity: f32) -> Self {
        let len = ramp.len();
        let max_index = ramp.max_index();
        let (spread, reach, weights) = if diversity > 0.0 {
            let spread = ((len as f64 * f64::from(diversity)).floor() as usize).max(1);
            // σ suit le spread complet, la table s'arrête aux bornes de la rampe.
            let reach = spread.min(max_index);
            let sigma = (spread as f64 / 2.0).max(0.5);
            let weights = (0..=2 * reach)
                .map(|i| {
                    let d = i as f64 - reach as f64;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect();
            (spread, reach, weights)
        } else {
            (0, 0, Vec::new())
        };
        Self {
            lut: LuminanceLut::new(ramp),
            max_index,
            spread,
            reach,
            weights,
        }
    }

    /// Deterministic base index: `floor(L / 255 · (len − 1))`.
    #[inline(always)]
    #[must_use]
    pub fn base_index(&self, luminance: u8) -> usize {
        self.lut.index(luminance)
    }

    /// Final index for `luminance`, drawing from `rng` when diversity is on.
    pub fn select(&self, luminance: u8, rng: &mut fastrand::Rng) -> usize {
        let base = self.base_index(luminance);
        if self.spread == 0 {
            return base;
        }

        let low = base.saturating_sub(self.spread);
        let high = (base + self.spread).min(self.max_index);
        // Window offsets into the precomputed weight table.
        let first = low + self.reach - base;
        let last = high + self.reach - base;
        let window = &self.weights[first..=last];

        let total: f64 = window.iter().sum();
        let mut pick = rng.f64() * total;
        for (i, w) in window.iter().enumerate() {
            if pick < *w {
                return low + i;
            }
            pick -= w;
        }
        high
    }

    /// Half-width of the diversity window (0 when disabled).
    #[must_use]
    pub fn spread(&self) -> usize {
        self.spread
    }
}

/// Coordinate a cell reads its sample from.
///
/// `Random` jitters each axis independently by −1, 0 or +1, clamped to the grid.
#[inline]
pub fn sample_coord(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    method: SampleMethod,
    rng: &mut fastrand::Rng,
) -> (u32, u32) {
    match method {
        SampleMethod::Center => (x, y),
        SampleMethod::Random => {
            let jx = (i64::from(x) + i64::from(rng.i32(-1..=1))).clamp(0, i64::from(width) - 1);
            let jy = (i64::from(y) + i64::from(rng.i32(-1..=1))).clamp(0, i64::from(height) - 1);
            (jx as u32, jy as u32)
        }
    }
}
