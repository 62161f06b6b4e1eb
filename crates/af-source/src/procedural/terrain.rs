use std::f64::consts::TAU;

use af_core::color::{Rgb, lerp};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::{Canvas, Pattern};

/// Altitude bands, from sea floor to peaks: (upper bound, low color, high color).
const BANDS: [(f32, Rgb, Rgb); 5] = [
    (0.35, (5, 20, 70), (30, 90, 170)),
    (0.42, (194, 178, 128), (220, 205, 150)),
    (0.65, (40, 110, 40), (90, 150, 60)),
    (0.82, (110, 95, 80), (150, 140, 130)),
    (1.0, (220, 220, 230), (255, 255, 255)),
];

/// Relief en couches : bruit fractal de Perlin plus crêtes sinusoïdales.
pub struct Terrain {
    fbm: Fbm<Perlin>,
    ridge_phase: (f64, f64),
    aspect: f64,
}

impl Terrain {
    /// Draw the noise seed and ridge phases from `rng`.
    #[must_use]
    pub fn new(canvas: Canvas, rng: &mut fastrand::Rng) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(rng.u32(..)).set_octaves(5),
            ridge_phase: (rng.f64() * TAU, rng.f64() * TAU),
            aspect: f64::from(canvas.cell_aspect),
        }
    }
}

impl Pattern for Terrain {
    fn value(&self, x: u32, y: u32, w: u32, h: u32) -> f32 {
        let span = f64::from(w.max(h).max(1));
        let nx = f64::from(x) / span * 4.0;
        let ny = f64::from(y) * self.aspect / span * 4.0;
        let base = self.fbm.get([nx, ny]) * 0.5 + 0.5;
        let ridges = (nx * 2.3 + self.ridge_phase.0).sin() * 0.08
            + (ny * 3.1 + self.ridge_phase.1).sin() * 0.06;
        (base * 0.85 + ridges + 0.08).clamp(0.0, 1.0) as f32
    }

    fn color(&self, v: f32, _x: u32, _y: u32) -> Rgb {
        let mut lower = 0.0;
        for (upper, low, high) in BANDS {
            if v <= upper {
                let t = (v - lower) / (upper - lower);
                return lerp(low, high, t);
            }
            lower = upper;
        }
        BANDS[BANDS.len() - 1].2
    }
}
