use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{Ramp, RampPreset};
use crate::color::{Rgb, parse_palette};
use crate::error::CoreError;

/// Largest grid accepted on either axis, in cells.
pub const MAX_GRID_SIDE: u32 = 2000;

/// Configuration complète d'un rendu.
///
/// Immutable once validated; every stage borrows it. Sérialisable en TOML,
/// chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use af_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.char_width, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    // === Échantillonnage ===
    /// Image downsample factor.
    pub scale: f64,
    /// Cell width in output pixels.
    pub char_width: u32,
    /// Cell height in output pixels.
    pub char_height: u32,
    /// Glyph size in pixels.
    pub font_size: f32,
    /// Sampling strategy.
    pub sample_method: SampleMethod,

    // === Glyphes ===
    /// Built-in ramp, used when `charset` is absent.
    pub preset: RampPreset,
    /// Literal ramp, sparse → dense. Wins over `preset`.
    pub charset: Option<String>,
    /// Gaussian glyph diversity, ≥ 0. 0 = disabled.
    pub diversity: f32,
    /// Complement luminance before glyph selection.
    pub invert: bool,

    // === Dithering ===
    /// Dithering strategy.
    pub dither: DitherMode,
    /// Ordered-dither nudge probability scale [0.0, 1.0].
    pub dither_strength: f32,

    // === Couleur ===
    /// Cell color rule.
    pub color_mode: ColorMode,
    /// Palette for [`ColorMode::Palette`].
    pub palette: Vec<Rgb>,
    /// Multiplicative brightness. 1.0 = neutre.
    pub brightness: f32,
    /// Multiplicative contrast. 1.0 = neutre.
    pub contrast: f32,

    // === Procédural ===
    /// Random stream seed. `None` = unpredictable.
    pub seed: Option<u64>,
    /// Pattern for procedural sources.
    pub style: ProceduralStyle,
    /// Procedural grid width in cells.
    pub target_width: u32,
    /// Procedural grid height in cells.
    pub target_height: u32,

    // === Sortie ===
    /// Image or text.
    pub output_mode: OutputMode,
    /// Explicit font file. Falls back to platform fonts when absent or unusable.
    pub font: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 0.08,
            char_width: 10,
            char_height: 18,
            font_size: 14.0,
            sample_method: SampleMethod::Center,
            preset: RampPreset::Dense,
            charset: None,
            diversity: 0.0,
            invert: false,
            dither: DitherMode::None,
            dither_strength: 0.25,
            color_mode: ColorMode::Rgb,
            palette: Vec::new(),
            brightness: 1.0,
            contrast: 1.0,
            seed: None,
            style: ProceduralStyle::Waves,
            target_width: 120,
            target_height: 60,
            output_mode: OutputMode::Image,
            font: None,
        }
    }
}

impl RenderConfig {
    /// Check every field once, at request entry.
    ///
    /// # Errors
    /// The first offending field, as [`CoreError::InvalidValue`] or
    /// [`CoreError::EmptyCharset`].
    ///
    /// # Example
    /// ```
    /// use af_core::config::RenderConfig;
    /// let config = RenderConfig { diversity: -0.5, ..RenderConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        fn check(ok: bool, field: &'static str, reason: impl Into<String>) -> Result<(), CoreError> {
            if ok {
                Ok(())
            } else {
                Err(CoreError::InvalidValue {
                    field,
                    reason: reason.into(),
                })
            }
        }

        check(
            self.scale.is_finite() && self.scale > 0.0 && self.scale <= 4.0,
            "scale",
            format!("{} not in (0, 4]", self.scale),
        )?;
        check(
            (1..=256).contains(&self.char_width),
            "char_width",
            format!("{} not in 1..=256", self.char_width),
        )?;
        check(
            (1..=256).contains(&self.char_height),
            "char_height",
            format!("{} not in 1..=256", self.char_height),
        )?;
        check(
            self.font_size.is_finite() && (1.0..=512.0).contains(&self.font_size),
            "font_size",
            format!("{} not in [1, 512]", self.font_size),
        )?;
        check(
            self.diversity.is_finite() && self.diversity >= 0.0,
            "diversity",
            format!("{} must be finite and >= 0", self.diversity),
        )?;
        check(
            (0.0..=1.0).contains(&self.dither_strength),
            "dither_strength",
            format!("{} not in [0, 1]", self.dither_strength),
        )?;
        check(
            (0.0..=10.0).contains(&self.brightness),
            "brightness",
            format!("{} not in [0, 10]", self.brightness),
        )?;
        check(
            (0.0..=10.0).contains(&self.contrast),
            "contrast",
            format!("{} not in [0, 10]", self.contrast),
        )?;
        check(
            (1..=MAX_GRID_SIDE).contains(&self.target_width),
            "target_width",
            format!("{} not in 1..={MAX_GRID_SIDE}", self.target_width),
        )?;
        check(
            (1..=MAX_GRID_SIDE).contains(&self.target_height),
            "target_height",
            format!("{} not in 1..={MAX_GRID_SIDE}", self.target_height),
        )?;
        check(
            self.color_mode != ColorMode::Palette || !self.palette.is_empty(),
            "palette",
            "color_mode `palette` needs at least one palette color",
        )?;
        self.ramp().map(|_| ())
    }

    /// Resolve the active ramp: literal `charset` wins over `preset`.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharset`] when the literal charset has no glyphs.
    ///
    /// # Example
    /// ```
    /// use af_core::config::RenderConfig;
    /// let config = RenderConfig { charset: Some("ab".into()), ..RenderConfig::default() };
    /// assert_eq!(config.ramp().unwrap().len(), 2);
    /// ```
    pub fn ramp(&self) -> Result<Ramp, CoreError> {
        match &self.charset {
            Some(literal) => Ramp::new(literal),
            None => Ok(Ramp::preset(self.preset)),
        }
    }

    /// Fresh random stream owned by one render.
    ///
    /// Seeded from `seed` when present, from an unpredictable source otherwise.
    /// Never touches a process-global generator.
    ///
    /// # Example
    /// ```
    /// use af_core::config::RenderConfig;
    /// let config = RenderConfig { seed: Some(7), ..RenderConfig::default() };
    /// assert_eq!(config.rng().u64(..), config.rng().u64(..));
    /// ```
    #[must_use]
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Grid size for an image of `width × height` pixels, with aspect
    /// correction for non-square cells.
    ///
    /// `w = max(1, floor(width · scale))`,
    /// `h = max(1, floor(height · scale / (char_width / char_height)))`.
    ///
    /// # Example
    /// ```
    /// use af_core::config::RenderConfig;
    /// let config = RenderConfig::default();
    /// assert_eq!(config.grid_size(1000, 1000), (80, 144));
    /// ```
    #[must_use]
    pub fn grid_size(&self, width: u32, height: u32) -> (u32, u32) {
        let w = (f64::from(width) * self.scale).floor();
        // Rearranged as h·scale·ch/cw to keep exact products exact.
        let h = (f64::from(height) * self.scale * f64::from(self.char_height)
            / f64::from(self.char_width.max(1)))
        .floor();
        (w.max(1.0) as u32, h.max(1.0) as u32)
    }
}

/// Where a cell reads its sample from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMethod {
    /// Exact cell coordinate.
    #[default]
    Center,
    /// Coordinate jittered by ±1 cell per axis, clamped to the grid.
    Random,
}

/// Dithering strategy. Exactly one is active per render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DitherMode {
    /// No dithering.
    #[default]
    None,
    /// Bayer 4×4 nudging of chosen glyph indices (post-selection).
    Ordered,
    /// Floyd–Steinberg over luminance (pre-selection).
    #[serde(alias = "floyd-steinberg", alias = "floyd_steinberg")]
    ErrorDiffusion,
}

/// Cell color rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Sample color as is.
    #[default]
    Rgb,
    /// Gray from luminance.
    Grayscale,
    /// Plain white.
    Mono,
    /// 6×6×6 cube.
    Quantized,
    /// Nearest color of [`RenderConfig::palette`].
    Palette,
}

/// Procedural pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProceduralStyle {
    /// Interfering sinusoids.
    #[default]
    Waves,
    /// Radial distance modulation.
    Radial,
    /// Coordinate-hash value noise.
    Noise,
    /// Fractal noise with sinusoidal ridges, colored by altitude.
    Terrain,
    /// Escape-time fractal.
    Mandelbrot,
}

/// Output payload kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// PNG raster.
    #[default]
    Image,
    /// Plain text grid.
    Text,
}

fn parse_variant<T: Copy>(
    field: &'static str,
    value: &str,
    table: &[(&str, T)],
    expected: &'static str,
) -> Result<T, CoreError> {
    let needle = value.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(needle))
        .map(|&(_, v)| v)
        .ok_or_else(|| CoreError::UnknownVariant {
            field,
            value: value.to_string(),
            expected,
        })
}

impl FromStr for SampleMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "sample_method",
            s,
            &[("center", Self::Center), ("random", Self::Random)],
            "center, random",
        )
    }
}

impl FromStr for DitherMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "dither",
            s,
            &[
                ("none", Self::None),
                ("false", Self::None),
                ("ordered", Self::Ordered),
                ("true", Self::Ordered),
                ("errordiffusion", Self::ErrorDiffusion),
                ("floyd-steinberg", Self::ErrorDiffusion),
                ("floyd_steinberg", Self::ErrorDiffusion),
            ],
            "none, ordered, errordiffusion",
        )
    }
}

impl FromStr for ColorMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "color_mode",
            s,
            &[
                ("rgb", Self::Rgb),
                ("grayscale", Self::Grayscale),
                ("mono", Self::Mono),
                ("quantized", Self::Quantized),
                ("palette", Self::Palette),
            ],
            "rgb, grayscale, mono, quantized, palette",
        )
    }
}

impl FromStr for ProceduralStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "style",
            s,
            &[
                ("waves", Self::Waves),
                ("radial", Self::Radial),
                ("noise", Self::Noise),
                ("terrain", Self::Terrain),
                ("mandelbrot", Self::Mandelbrot),
            ],
            "waves, radial, noise, terrain, mandelbrot",
        )
    }
}

impl FromStr for OutputMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant(
            "output_mode",
            s,
            &[("image", Self::Image), ("text", Self::Text)],
            "image, text",
        )
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: RenderSection,
}

/// `dither` accepts the legacy boolean as well as a mode name.
#[derive(Deserialize)]
#[serde(untagged)]
enum DitherField {
    Enabled(bool),
    Mode(String),
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    scale: Option<f64>,
    char_width: Option<u32>,
    char_height: Option<u32>,
    font_size: Option<f32>,
    sample_method: Option<String>,
    preset: Option<String>,
    charset: Option<String>,
    diversity: Option<f32>,
    invert: Option<bool>,
    dither: Option<DitherField>,
    dither_strength: Option<f32>,
    color_mode: Option<String>,
    palette: Option<Vec<String>>,
    brightness: Option<f32>,
    contrast: Option<f32>,
    seed: Option<u64>,
    style: Option<String>,
    target_width: Option<u32>,
    target_height: Option<u32>,
    output_mode: Option<String>,
    font: Option<PathBuf>,
}

impl RenderSection {
    /// Keys present in the section, in declaration order.
    fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        macro_rules! present {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_some() {
                    keys.push(stringify!($field));
                })*
            };
        }
        present!(
            scale,
            char_width,
            char_height,
            font_size,
            sample_method,
            preset,
            charset,
            diversity,
            invert,
            dither,
            dither_strength,
            color_mode,
            palette,
            brightness,
            contrast,
            seed,
            style,
            target_width,
            target_height,
            output_mode,
            font,
        );
        keys
    }
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// The result is validated before being returned.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or holds invalid values.
///
/// # Example
/// ```no_run
/// use af_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("asciiforge.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}

/// Parse TOML text into a validated configuration.
///
/// # Errors
/// Returns an error on TOML syntax errors, unknown enum values or invalid ranges.
///
/// # Example
/// ```
/// use af_core::config::{parse_config, DitherMode};
/// let config = parse_config("[render]\ndither = true\nscale = 0.1").unwrap();
/// assert_eq!(config.dither, DitherMode::Ordered);
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let r = file.render;
    let keys = r.present_keys();
    if keys.is_empty() {
        log::debug!("[render] vide : valeurs par défaut");
    } else {
        log::debug!("[render] surcharge : {}", keys.join(", "));
    }
    let mut config = RenderConfig::default();

    if let Some(v) = r.scale {
        config.scale = v;
    }
    if let Some(v) = r.char_width {
        config.char_width = v;
    }
    if let Some(v) = r.char_height {
        config.char_height = v;
    }
    if let Some(v) = r.font_size {
        config.font_size = v;
    }
    if let Some(v) = r.sample_method {
        config.sample_method = v.parse()?;
    }
    if let Some(v) = r.preset {
        config.preset = v.parse()?;
    }
    if r.charset.is_some() {
        config.charset = r.charset;
    }
    if let Some(v) = r.diversity {
        config.diversity = v;
    }
    if let Some(v) = r.invert {
        config.invert = v;
    }
    match r.dither {
        Some(DitherField::Enabled(true)) => config.dither = DitherMode::Ordered,
        Some(DitherField::Enabled(false)) => config.dither = DitherMode::None,
        Some(DitherField::Mode(m)) => config.dither = m.parse()?,
        None => {}
    }
    if let Some(v) = r.dither_strength {
        config.dither_strength = v;
    }
    if let Some(v) = r.color_mode {
        config.color_mode = v.parse()?;
    }
    if let Some(v) = r.palette {
        config.palette = parse_palette(&v.join(","))?;
    }
    if let Some(v) = r.brightness {
        config.brightness = v;
    }
    if let Some(v) = r.contrast {
        config.contrast = v;
    }
    if r.seed.is_some() {
        config.seed = r.seed;
    }
    if let Some(v) = r.style {
        config.style = v.parse()?;
    }
    if let Some(v) = r.target_width {
        config.target_width = v;
    }
    if let Some(v) = r.target_height {
        config.target_height = v;
    }
    if let Some(v) = r.output_mode {
        config.output_mode = v.parse()?;
    }
    if r.font.is_some() {
        config.font = r.font;
    }

    config.validate()?;
    Ok(config)
}
