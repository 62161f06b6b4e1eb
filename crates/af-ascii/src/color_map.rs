use af_core::color::{Rgb, luminance, nearest, quantize_cube};
use af_core::config::ColorMode;

/// Map a sample color according to the selected color mode.
///
/// `Grayscale` reads the sample's own luminance, so `invert` never reaches
/// the color.
///
/// # Example
/// ```
/// use af_ascii::color_map::map_color;
/// use af_core::config::ColorMode;
/// assert_eq!(map_color((200, 50, 50), ColorMode::Rgb, &[]), (200, 50, 50));
/// assert_eq!(map_color((200, 50, 50), ColorMode::Grayscale, &[]), (94, 94, 94));
/// ```
#[must_use]
pub fn map_color(rgb: Rgb, mode: ColorMode, palette: &[Rgb]) -> Rgb {
    match mode {
        ColorMode::Rgb => rgb,
        ColorMode::Grayscale => {
            let l = luminance(rgb.0, rgb.1, rgb.2);
            (l, l, l)
        }
        ColorMode::Mono => (255, 255, 255),
        ColorMode::Quantized => quantize_cube(rgb),
        ColorMode::Palette => nearest(rgb, palette),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode() {
        let c = (130, 20, 250);
        assert_eq!(map_color(c, ColorMode::Mono, &[]), (255, 255, 255));
        assert_eq!(map_color(c, ColorMode::Quantized, &[]), (153, 0, 255));
        let palette = [(255, 0, 0), (0, 0, 255)];
        assert_eq!(map_color(c, ColorMode::Palette, &palette), (0, 0, 255));
    }
}
