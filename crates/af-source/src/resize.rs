use af_core::CoreError;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use image::RgbImage;

/// Resizer bilinéaire wrappant fast_image_resize.
///
/// Convolution-based, so downsampling averages over the whole footprint of each
/// destination pixel instead of point-sampling.
///
/// # Example
/// ```
/// use af_source::resize::Resizer;
/// use image::RgbImage;
/// let mut r = Resizer::new();
/// let small = r.resize(&RgbImage::new(100, 60), 10, 6).unwrap();
/// assert_eq!(small.dimensions(), (10, 6));
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
}

impl Resizer {
    /// Create a bilinear resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        }
    }

    /// Resize `src` to `width × height`.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for zero-sized targets or buffers the
    /// resizer rejects.
    pub fn resize(&mut self, src: &RgbImage, width: u32, height: u32) -> Result<RgbImage, CoreError> {
        let bad_dims = || CoreError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(bad_dims());
        }
        if src.dimensions() == (width, height) {
            return Ok(src.clone());
        }

        // fast_image_resize wants a mutable source slice
        let (src_w, src_h) = src.dimensions();
        let mut src_buf = src.as_raw().clone();
        let src_image = Image::from_slice_u8(src_w, src_h, &mut src_buf, PixelType::U8x3)
            .map_err(|e| {
                log::debug!("Invalid source buffer: {e}");
                CoreError::InvalidDimensions {
                    width: src_w,
                    height: src_h,
                }
            })?;

        let mut dst_image = Image::new(width, height, PixelType::U8x3);
        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| {
                log::debug!("Resize failed: {e}");
                bad_dims()
            })?;

        RgbImage::from_raw(width, height, dst_image.into_vec()).ok_or_else(bad_dims)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_stays_uniform() {
        let src = RgbImage::from_pixel(64, 48, image::Rgb([200, 100, 50]));
        let dst = Resizer::new().resize(&src, 7, 5).unwrap();
        for p in dst.pixels() {
            for (got, want) in p.0.iter().zip([200u8, 100, 50]) {
                assert!(got.abs_diff(want) <= 1, "{:?}", p.0);
            }
        }
    }

    #[test]
    fn zero_target_is_rejected() {
        let src = RgbImage::new(4, 4);
        assert!(Resizer::new().resize(&src, 0, 3).is_err());
    }

    #[test]
    fn same_size_is_a_copy() {
        let mut src = RgbImage::new(3, 2);
        src.put_pixel(1, 1, image::Rgb([1, 2, 3]));
        assert_eq!(Resizer::new().resize(&src, 3, 2).unwrap(), src);
    }
}
