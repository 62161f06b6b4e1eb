use af_core::color::Rgb;

use super::Pattern;

/// Lattice spacing of the coarse octave, in cells.
const CELL: u32 = 6;

/// Bruit de valeur par hachage des coordonnées.
///
/// Two octaves: a smoothed lattice of hashed values plus a fine per-cell hash.
pub struct HashNoise {
    salt: u64,
}

impl HashNoise {
    /// Draw the hash salt from `rng`.
    #[must_use]
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        Self { salt: rng.u64(..) }
    }

    /// Uniform value in [0, 1) for an integer coordinate.
    #[inline(always)]
    fn hash(&self, x: u32, y: u32) -> f32 {
        // splitmix64 finalizer over the packed coordinate
        let mut z = ((u64::from(x) << 32) | u64::from(y)) ^ self.salt;
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 40) as f32 / (1u64 << 24) as f32
    }

    fn smooth(&self, x: u32, y: u32) -> f32 {
        let (gx, gy) = (x / CELL, y / CELL);
        let tx = smoothstep((x % CELL) as f32 / CELL as f32);
        let ty = smoothstep((y % CELL) as f32 / CELL as f32);
        let top = lerp(self.hash(gx, gy), self.hash(gx + 1, gy), tx);
        let bottom = lerp(self.hash(gx, gy + 1), self.hash(gx + 1, gy + 1), tx);
        lerp(top, bottom, ty)
    }
}

impl Pattern for HashNoise {
    fn value(&self, x: u32, y: u32, _w: u32, _h: u32) -> f32 {
        0.8 * self.smooth(x, y) + 0.2 * self.hash(x.wrapping_add(7919), y)
    }

    fn color(&self, v: f32, _x: u32, _y: u32) -> Rgb {
        let g = (v * 255.0) as u8;
        (g, g, g)
    }
}

#[inline(always)]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_normalized() {
        let noise = HashNoise { salt: 17 };
        for y in 0..20 {
            for x in 0..20 {
                let v = noise.value(x, y, 20, 20);
                assert!((0.0..1.0).contains(&v));
                assert!((v - noise.value(x, y, 20, 20)).abs() < f32::EPSILON);
            }
        }
    }
}
