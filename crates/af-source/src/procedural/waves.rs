use std::f32::consts::TAU;

use af_core::color::{Rgb, lerp};

use super::{Canvas, Pattern};

const DEEP: Rgb = (8, 24, 80);
const CREST: Rgb = (140, 235, 255);

/// Interférence de trois sinusoïdes de phases aléatoires.
pub struct Waves {
    phases: [f32; 3],
    freq: f32,
    aspect: f32,
}

impl Waves {
    /// Draw phases and base frequency from `rng`.
    #[must_use]
    pub fn new(canvas: Canvas, rng: &mut fastrand::Rng) -> Self {
        Self {
            phases: [rng.f32() * TAU, rng.f32() * TAU, rng.f32() * TAU],
            freq: 0.08 + rng.f32() * 0.08,
            aspect: canvas.cell_aspect,
        }
    }
}

impl Pattern for Waves {
    fn value(&self, x: u32, y: u32, _w: u32, _h: u32) -> f32 {
        let fx = x as f32;
        let fy = y as f32 * self.aspect;
        let k = self.freq;
        let sum = (fx * k + self.phases[0]).sin()
            + (fy * k * 1.7 + self.phases[1]).sin()
            + ((fx + fy) * k * 0.6 + self.phases[2]).sin();
        (sum / 3.0 + 1.0) * 0.5
    }

    fn color(&self, v: f32, _x: u32, _y: u32) -> Rgb {
        lerp(DEEP, CREST, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_normalized() {
        let waves = Waves::new(Canvas { cell_aspect: 1.8 }, &mut fastrand::Rng::with_seed(9));
        for y in 0..50 {
            for x in 0..50 {
                let v = waves.value(x, y, 50, 50);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
