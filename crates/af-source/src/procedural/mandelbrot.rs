use af_core::color::{Rgb, lerp};

use super::{Canvas, Pattern};

const MAX_ITER: u32 = 100;

/// Coordonnées de focus de la fractale (Vallée des hippocampes).
const FOCUS: (f64, f64) = (-0.743_643_887_037_151, 0.131_825_904_205_330);

const STOPS: [Rgb; 3] = [(20, 0, 60), (200, 40, 120), (255, 220, 90)];

/// Ensemble de Mandelbrot, coloration lissée.
///
/// A small random zoom and rotation keep unseeded renders from repeating.
pub struct Mandelbrot {
    zoom: f64,
    cos_a: f64,
    sin_a: f64,
    aspect: f64,
}

impl Mandelbrot {
    /// Draw the zoom factor and rotation from `rng`.
    #[must_use]
    pub fn new(canvas: Canvas, rng: &mut fastrand::Rng) -> Self {
        let rot = (rng.f64() - 0.5) * 0.6;
        Self {
            zoom: 1.0 + rng.f64() * 0.5,
            cos_a: rot.cos(),
            sin_a: rot.sin(),
            aspect: f64::from(canvas.cell_aspect),
        }
    }
}

impl Pattern for Mandelbrot {
    fn value(&self, px: u32, py: u32, w: u32, h: u32) -> f32 {
        let w = f64::from(w);
        let h = f64::from(h) * self.aspect;
        let span = w.max(h);

        // Mapping cellule -> plan complexe centré avec zoom
        let raw_x = (f64::from(px) - w / 2.0) / (span * self.zoom) * 3.5;
        let raw_y = (f64::from(py) * self.aspect - h / 2.0) / (span * self.zoom) * 3.5;
        let cx = raw_x * self.cos_a - raw_y * self.sin_a + FOCUS.0;
        let cy = raw_x * self.sin_a + raw_y * self.cos_a + FOCUS.1;

        let (mut x, mut y) = (0.0f64, 0.0f64);
        let mut iter = 0;
        // Z = Z^2 + C
        while x * x + y * y <= 4.0 && iter < MAX_ITER {
            let xtemp = x * x - y * y + cx;
            y = 2.0 * x * y + cy;
            x = xtemp;
            iter += 1;
        }

        if iter == MAX_ITER {
            return 0.0;
        }
        let log_zn = (x * x + y * y).ln() / 2.0;
        let nu = (log_zn / std::f64::consts::LN_2).ln() / std::f64::consts::LN_2;
        let smooth = f64::from(iter) + 1.0 - nu;
        (smooth / f64::from(MAX_ITER)).clamp(0.0, 1.0) as f32
    }

    fn color(&self, v: f32, _x: u32, _y: u32) -> Rgb {
        if v < 0.5 {
            lerp(STOPS[0], STOPS[1], v * 2.0)
        } else {
            lerp(STOPS[1], STOPS[2], (v - 0.5) * 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_values_are_normalized_and_nan_free() {
        let m = Mandelbrot::new(Canvas { cell_aspect: 2.0 }, &mut fastrand::Rng::with_seed(11));
        for y in 0..30 {
            for x in 0..60 {
                let v = m.value(x, y, 60, 30);
                assert!(v.is_finite() && (0.0..=1.0).contains(&v));
            }
        }
    }
}
