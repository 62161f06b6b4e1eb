//! Glyph ramps.
//!
//! Convention: every ramp is ordered from the sparsest glyph (least ink) to the
//! densest. Glyphs are drawn in the sample color on a black canvas, so a bright
//! sample lands on a dense glyph. `invert` is the only reversal axis.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 10 caractères, compact, bon contraste.
pub const CHARSET_STANDARD: &str = " .:-=+*#%@";

/// 70 caractères, Paul Bourke, résolution maximale.
pub const CHARSET_DENSE: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Blocs Unicode : pseudo-pixels.
pub const CHARSET_BLOCKS: &str = " ░▒▓█";

/// Deux niveaux.
pub const CHARSET_BINARY: &str = "10";

/// Alphabet, minuscules puis majuscules.
pub const CHARSET_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Named built-in ramp.
///
/// # Example
/// ```
/// use af_core::charset::RampPreset;
/// let preset: RampPreset = "blocks".parse().unwrap();
/// assert_eq!(preset.glyphs(), " ░▒▓█");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RampPreset {
    /// [`CHARSET_STANDARD`].
    Standard,
    /// [`CHARSET_DENSE`].
    #[default]
    Dense,
    /// [`CHARSET_BLOCKS`].
    Blocks,
    /// [`CHARSET_BINARY`].
    Binary,
    /// [`CHARSET_LETTERS`].
    Letters,
}

impl RampPreset {
    /// All presets, in display order.
    pub const ALL: [Self; 5] = [
        Self::Standard,
        Self::Dense,
        Self::Blocks,
        Self::Binary,
        Self::Letters,
    ];

    /// Glyph string of the preset.
    #[must_use]
    pub fn glyphs(self) -> &'static str {
        match self {
            Self::Standard => CHARSET_STANDARD,
            Self::Dense => CHARSET_DENSE,
            Self::Blocks => CHARSET_BLOCKS,
            Self::Binary => CHARSET_BINARY,
            Self::Letters => CHARSET_LETTERS,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Dense => "dense",
            Self::Blocks => "blocks",
            Self::Binary => "binary",
            Self::Letters => "letters",
        }
    }
}

impl FromStr for RampPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownVariant {
                field: "preset",
                value: s.to_string(),
                expected: "standard, dense, blocks, binary, letters",
            })
    }
}

/// Ordered, non-empty glyph sequence.
///
/// # Example
/// ```
/// use af_core::charset::Ramp;
/// let ramp = Ramp::new(" .:#@").unwrap();
/// assert_eq!(ramp.len(), 5);
/// assert_eq!(ramp.glyph(4), '@');
/// assert!(Ramp::new("").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ramp {
    glyphs: Vec<char>,
}

impl Ramp {
    /// Build a ramp from a literal string.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharset`] if `glyphs` has no characters.
    pub fn new(glyphs: &str) -> Result<Self, CoreError> {
        let glyphs: Vec<char> = glyphs.chars().filter(|c| !c.is_control()).collect();
        if glyphs.is_empty() {
            return Err(CoreError::EmptyCharset);
        }
        Ok(Self { glyphs })
    }

    /// Ramp of a built-in preset.
    #[must_use]
    pub fn preset(preset: RampPreset) -> Self {
        Self {
            glyphs: preset.glyphs().chars().collect(),
        }
    }

    /// Number of glyphs (always ≥ 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Highest valid index.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.glyphs.len() - 1
    }

    /// Glyph at `idx`, clamped to the ramp.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, idx: usize) -> char {
        self.glyphs[idx.min(self.max_index())]
    }

    /// Underlying glyphs.
    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

/// Lookup table mapping luminance [0..255] → ramp index.
///
/// Pre-computed once per ramp for O(1) per-cell cost.
/// `index = floor(L / 255 * (len - 1))`.
///
/// # Example
/// ```
/// use af_core::charset::{LuminanceLut, Ramp};
/// let lut = LuminanceLut::new(&Ramp::new(" .:#@").unwrap());
/// assert_eq!(lut.index(0), 0);
/// assert_eq!(lut.index(128), 2);
/// assert_eq!(lut.index(255), 4);
/// ```
pub struct LuminanceLut {
    lut: [u16; 256],
}

impl LuminanceLut {
    /// Build the table for `ramp`.
    #[must_use]
    pub fn new(ramp: &Ramp) -> Self {
        let max = ramp.max_index();
        let mut lut = [0u16; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = (i * max / 255).min(max) as u16;
        }
        Self { lut }
    }

    /// Map a luminance value to its base ramp index.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, luminance: u8) -> usize {
        usize::from(self.lut[usize::from(luminance)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lut_stays_in_bounds_for_every_preset() {
        for preset in RampPreset::ALL {
            let ramp = Ramp::preset(preset);
            let lut = LuminanceLut::new(&ramp);
            for l in 0..=255u8 {
                assert!(lut.index(l) < ramp.len(), "{preset:?} out of range at {l}");
            }
            assert_eq!(lut.index(255), ramp.max_index());
        }
    }

    #[test]
    fn lut_monotonic() {
        let lut = LuminanceLut::new(&Ramp::preset(RampPreset::Dense));
        let mut prev = 0usize;
        for l in 0..=255u8 {
            let idx = lut.index(l);
            assert!(idx >= prev, "LUT non monotone à luminance {l}");
            prev = idx;
        }
    }

    #[test]
    fn single_glyph_ramp_always_maps_to_zero() {
        let ramp = Ramp::new("#").unwrap();
        let lut = LuminanceLut::new(&ramp);
        assert_eq!(lut.index(0), 0);
        assert_eq!(lut.index(255), 0);
    }

    #[test]
    fn control_characters_are_dropped() {
        assert!(matches!(Ramp::new("\n\t"), Err(CoreError::EmptyCharset)));
        assert_eq!(Ramp::new("a\nb").unwrap().len(), 2);
    }

    #[test]
    fn preset_names_roundtrip() {
        for preset in RampPreset::ALL {
            assert_eq!(preset.name().parse::<RampPreset>().unwrap(), preset);
        }
        assert!("fancy".parse::<RampPreset>().is_err());
    }
}
