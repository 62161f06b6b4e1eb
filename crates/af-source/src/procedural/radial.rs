use std::f32::consts::TAU;

use af_core::color::{Rgb, lerp};

use super::{Canvas, Pattern};

const EMBER: Rgb = (70, 8, 0);
const FLARE: Rgb = (255, 205, 70);

/// Anneaux concentriques modulés par la distance au centre.
pub struct Radial {
    /// Center offset from the grid middle, as a fraction of each side.
    offset: (f32, f32),
    freq: f32,
    phase: f32,
    aspect: f32,
}

impl Radial {
    /// Draw center jitter, ring frequency and phase from `rng`.
    #[must_use]
    pub fn new(canvas: Canvas, rng: &mut fastrand::Rng) -> Self {
        Self {
            offset: ((rng.f32() - 0.5) * 0.25, (rng.f32() - 0.5) * 0.25),
            freq: 0.15 + rng.f32() * 0.2,
            phase: rng.f32() * TAU,
            aspect: canvas.cell_aspect,
        }
    }
}

impl Pattern for Radial {
    fn value(&self, x: u32, y: u32, w: u32, h: u32) -> f32 {
        let (w, h) = (w as f32, h as f32);
        let cx = w * (0.5 + self.offset.0);
        let cy = h * (0.5 + self.offset.1);
        let dx = x as f32 - cx;
        let dy = (y as f32 - cy) * self.aspect;
        let d = (dx * dx + dy * dy).sqrt();
        let reach = (w * w + (h * self.aspect).powi(2)).sqrt().max(1.0);
        let falloff = (1.0 - d / reach).clamp(0.0, 1.0);
        (0.5 + 0.5 * (d * self.freq + self.phase).cos()) * (0.35 + 0.65 * falloff)
    }

    fn color(&self, v: f32, _x: u32, _y: u32) -> Rgb {
        lerp(EMBER, FLARE, v)
    }
}
