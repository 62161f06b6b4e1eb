use std::borrow::Cow;
use std::path::Path;

use af_core::config::{MAX_GRID_SIDE, RenderConfig};
use af_core::frame::SampleGrid;
use af_core::traits::Source;
use af_core::CoreError;
use image::RgbImage;

use crate::adjust;
use crate::resize::Resizer;

/// Source d'image statique décodée.
///
/// # Example
/// ```
/// use af_source::image::ImageSource;
/// use af_core::traits::Source;
/// use af_core::config::RenderConfig;
///
/// let source = ImageSource::from_rgb(image::RgbImage::new(100, 100));
/// let config = RenderConfig { scale: 0.1, ..RenderConfig::default() };
/// let grid = source.sample(&config, &mut fastrand::Rng::with_seed(1)).unwrap();
/// assert_eq!((grid.width, grid.height), (10, 18));
/// ```
pub struct ImageSource {
    image: RgbImage,
}

impl ImageSource {
    /// Decode raw encoded bytes (PNG, JPEG, BMP, GIF).
    ///
    /// # Errors
    /// [`CoreError::InvalidImage`] when the bytes are not a decodable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::InvalidImage("empty upload".into()));
        }
        let img = image::load_from_memory(bytes).map_err(|e| CoreError::InvalidImage(e.to_string()))?;
        log::debug!("Image décodée : {}×{}", img.width(), img.height());
        Ok(Self::from_rgb(img.to_rgb8()))
    }

    /// Wrap an already decoded image.
    #[must_use]
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Read and decode a file.
    ///
    /// # Errors
    /// [`CoreError::Io`] if the file cannot be read, [`CoreError::InvalidImage`]
    /// if it cannot be decoded.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Native dimensions.
    #[must_use]
    pub fn native_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl Source for ImageSource {
    fn sample(
        &self,
        config: &RenderConfig,
        _rng: &mut fastrand::Rng,
    ) -> Result<SampleGrid, CoreError> {
        // Enhancement happens at full resolution so it feeds the resize filter.
        let mut img = Cow::Borrowed(&self.image);
        if (config.brightness - 1.0).abs() >= f32::EPSILON {
            adjust::brighten(img.to_mut(), config.brightness);
        }
        if (config.contrast - 1.0).abs() >= f32::EPSILON {
            adjust::contrast(img.to_mut(), config.contrast);
        }

        let (orig_w, orig_h) = img.dimensions();
        let (width, height) = config.grid_size(orig_w, orig_h);
        if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(CoreError::InvalidDimensions { width, height });
        }

        let small = Resizer::new().resize(&img, width, height)?;
        let rgb = small.pixels().map(|p| (p[0], p[1], p[2])).collect();
        log::debug!("Échantillonnage {orig_w}×{orig_h} → {width}×{height}");
        Ok(SampleGrid::from_rgb(width, height, rgb, config.invert))
    }

    fn name(&self) -> &'static str {
        "image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn garbage_bytes_are_an_input_error() {
        let err = ImageSource::from_bytes(b"definitely not a png").err().unwrap();
        assert!(matches!(err, CoreError::InvalidImage(_)));
        assert!(err.is_input_error());
        assert!(matches!(
            ImageSource::from_bytes(&[]),
            Err(CoreError::InvalidImage(_))
        ));
    }

    #[test]
    fn decodes_png_and_applies_aspect() {
        let bytes = png_bytes(&RgbImage::new(1000, 1000));
        let source = ImageSource::from_bytes(&bytes).unwrap();
        let grid = source
            .sample(&RenderConfig::default(), &mut fastrand::Rng::with_seed(0))
            .unwrap();
        assert_eq!((grid.width, grid.height), (80, 144));
        assert_eq!(grid.len(), 80 * 144);
    }

    #[test]
    fn invert_flips_luminance_not_color() {
        let source = ImageSource::from_rgb(RgbImage::from_pixel(50, 50, image::Rgb([255, 255, 255])));
        let config = RenderConfig {
            scale: 0.1,
            invert: true,
            ..RenderConfig::default()
        };
        let grid = source.sample(&config, &mut fastrand::Rng::with_seed(0)).unwrap();
        assert!(grid.luma.iter().all(|&l| l == 0));
        assert!(grid.rgb.iter().all(|&c| c == (255, 255, 255)));
    }

    #[test]
    fn brightness_recomputes_luminance() {
        let source = ImageSource::from_rgb(RgbImage::from_pixel(20, 20, image::Rgb([200, 200, 200])));
        let config = RenderConfig {
            scale: 0.5,
            brightness: 0.5,
            ..RenderConfig::default()
        };
        let grid = source.sample(&config, &mut fastrand::Rng::with_seed(0)).unwrap();
        assert!(grid.luma.iter().all(|&l| l.abs_diff(100) <= 1));
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSource::open(&dir.path().join("nope.png")).err().unwrap();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
