//! Multiplicative enhancement applied to the full-resolution image, before
//! downsampling.

use af_core::color::luminance;
use image::RgbImage;

/// Brightness: blend toward black, `c' = c · factor`.
///
/// # Example
/// ```
/// use af_source::adjust::brighten;
/// let mut img = image::RgbImage::from_pixel(1, 1, image::Rgb([100, 200, 40]));
/// brighten(&mut img, 0.5);
/// assert_eq!(img.get_pixel(0, 0).0, [50, 100, 20]);
/// ```
pub fn brighten(img: &mut RgbImage, factor: f32) {
    if (factor - 1.0).abs() < f32::EPSILON {
        return;
    }
    for c in img.iter_mut() {
        *c = blend(0.0, f32::from(*c), factor);
    }
}

/// Contrast: blend toward a flat gray at the image's rounded mean luminance,
/// `c' = m + (c − m) · factor`.
///
/// # Example
/// ```
/// use af_source::adjust::contrast;
/// let mut img = image::RgbImage::from_pixel(2, 1, image::Rgb([90, 90, 90]));
/// img.put_pixel(1, 0, image::Rgb([110, 110, 110]));
/// contrast(&mut img, 2.0);
/// assert_eq!(img.get_pixel(0, 0).0, [80, 80, 80]);
/// assert_eq!(img.get_pixel(1, 0).0, [120, 120, 120]);
/// ```
pub fn contrast(img: &mut RgbImage, factor: f32) {
    if (factor - 1.0).abs() < f32::EPSILON {
        return;
    }
    let mean = mean_luminance(img);
    for c in img.iter_mut() {
        *c = blend(mean, f32::from(*c), factor);
    }
}

/// Rounded mean luminance over all pixels; 0 for an empty image.
#[must_use]
pub fn mean_luminance(img: &RgbImage) -> f32 {
    let count = u64::from(img.width()) * u64::from(img.height());
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = img
        .pixels()
        .map(|p| u64::from(luminance(p[0], p[1], p[2])))
        .sum();
    (sum as f64 / count as f64).round() as f32
}

#[inline(always)]
fn blend(base: f32, value: f32, factor: f32) -> u8 {
    (base + (value - base) * factor).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_factors_are_identity() {
        let mut img = RgbImage::from_fn(5, 3, |x, y| image::Rgb([x as u8 * 40, y as u8 * 70, 13]));
        let before = img.clone();
        brighten(&mut img, 1.0);
        contrast(&mut img, 1.0);
        assert_eq!(img, before);
    }

    #[test]
    fn brightness_saturates() {
        let mut img = RgbImage::from_pixel(1, 1, image::Rgb([200, 10, 0]));
        brighten(&mut img, 2.0);
        assert_eq!(img.get_pixel(0, 0).0, [255, 20, 0]);
    }

    #[test]
    fn zero_contrast_flattens_to_mean() {
        let mut img = RgbImage::from_pixel(2, 1, image::Rgb([0, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([255, 255, 255]));
        contrast(&mut img, 0.0);
        assert_eq!(img.get_pixel(0, 0), img.get_pixel(1, 0));
        assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128]);
    }
}
