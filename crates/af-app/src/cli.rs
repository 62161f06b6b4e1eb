use std::path::PathBuf;

use af_core::charset::RampPreset;
use af_core::color::parse_palette;
use af_core::config::{
    ColorMode, DitherMode, OutputMode, ProceduralStyle, RenderConfig, SampleMethod, load_config,
};
use af_core::error::CoreError;
use anyhow::{Context, Result};
use clap::Parser;

use crate::pipeline::RenderInput;

/// asciiforge : image ou motif procédural vers art en caractères.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source visuelle : chemin vers une image (PNG, JPEG, BMP, GIF).
    #[arg(long, conflicts_with_all = ["procedural", "batch"])]
    pub image: Option<PathBuf>,

    /// Motif procédural : waves, radial, noise, terrain, mandelbrot.
    #[arg(long, conflicts_with = "batch")]
    pub procedural: Option<ProceduralStyle>,

    /// Rendre toutes les images d'un dossier.
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Dossier de sortie du mode batch. Défaut : <batch>/asciiforge-out.
    #[arg(long, requires = "batch")]
    pub batch_out: Option<PathBuf>,

    /// Fichier de configuration TOML (table `[render]`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fichier de sortie. Absent : sortie standard.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Facteur de sous-échantillonnage de l'image.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Largeur d'une cellule en pixels.
    #[arg(long)]
    pub char_width: Option<u32>,

    /// Hauteur d'une cellule en pixels.
    #[arg(long)]
    pub char_height: Option<u32>,

    /// Taille des glyphes en pixels.
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Échantillonnage : center, random.
    #[arg(long)]
    pub sample_method: Option<SampleMethod>,

    /// Rampe prédéfinie : standard, dense, blocks, binary, letters.
    #[arg(long)]
    pub preset: Option<RampPreset>,

    /// Rampe littérale, du plus clair au plus dense. Prioritaire sur --preset.
    #[arg(long)]
    pub charset: Option<String>,

    /// Diversité gaussienne des glyphes (≥ 0, 0 = désactivée).
    #[arg(long)]
    pub diversity: Option<f32>,

    /// Inverser la luminance. `--invert false` annule un `invert = true` du fichier.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub invert: Option<bool>,

    /// Tramage : none, ordered, errordiffusion.
    #[arg(long)]
    pub dither: Option<DitherMode>,

    /// Force du tramage ordonné [0, 1].
    #[arg(long)]
    pub dither_strength: Option<f32>,

    /// Couleur : rgb, grayscale, mono, quantized, palette.
    #[arg(long)]
    pub color_mode: Option<ColorMode>,

    /// Palette, couleurs #rrggbb séparées par des virgules.
    #[arg(long)]
    pub palette: Option<String>,

    /// Luminosité multiplicative (1.0 = neutre).
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contraste multiplicatif (1.0 = neutre).
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Graine du flux aléatoire.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Largeur de la grille procédurale, en cellules.
    #[arg(long)]
    pub target_width: Option<u32>,

    /// Hauteur de la grille procédurale, en cellules.
    #[arg(long)]
    pub target_height: Option<u32>,

    /// Sortie : image, text.
    #[arg(long)]
    pub output_mode: Option<OutputMode>,

    /// Police TrueType/OpenType explicite.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one source is provided.
    ///
    /// # Errors
    /// [`CoreError::InvalidValue`] when zero or several sources are given.
    pub fn validate_source(&self) -> Result<(), CoreError> {
        let count = usize::from(self.image.is_some())
            + usize::from(self.procedural.is_some())
            + usize::from(self.batch.is_some());
        if count == 1 {
            return Ok(());
        }
        Err(CoreError::InvalidValue {
            field: "source",
            reason: "give exactly one of --image, --procedural or --batch".into(),
        })
    }

    /// Défauts, puis fichier de config, puis options de ligne de commande.
    ///
    /// # Errors
    /// Unreadable or invalid config file, invalid flag values.
    pub fn resolve_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RenderConfig::default(),
        };

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field {
                    config.$field = v;
                })*
            };
        }
        apply!(
            scale,
            char_width,
            char_height,
            font_size,
            sample_method,
            preset,
            diversity,
            invert,
            dither,
            dither_strength,
            color_mode,
            brightness,
            contrast,
            target_width,
            target_height,
            output_mode,
        );

        if let Some(style) = self.procedural {
            config.style = style;
        }
        if self.charset.is_some() {
            config.charset.clone_from(&self.charset);
        }
        if let Some(palette) = &self.palette {
            config.palette = parse_palette(palette)?;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.font.is_some() {
            config.font.clone_from(&self.font);
        }

        config.validate()?;
        Ok(config)
    }

    /// Input for a single render (`--image` or `--procedural`).
    ///
    /// # Errors
    /// Missing source, or unreadable image file.
    pub fn render_input(&self) -> Result<RenderInput> {
        if let Some(path) = &self.image {
            let bytes = std::fs::read(path)
                .map_err(CoreError::from)
                .with_context(|| format!("Impossible de lire {}", path.display()))?;
            return Ok(RenderInput::ImageBytes(bytes));
        }
        if self.procedural.is_some() {
            return Ok(RenderInput::Procedural);
        }
        Err(CoreError::InvalidValue {
            field: "source",
            reason: "no single-render source given".into(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("asciiforge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--procedural",
            "terrain",
            "--dither",
            "ordered",
            "--preset",
            "blocks",
            "--seed",
            "4",
        ]);
        cli.validate_source().unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.style, ProceduralStyle::Terrain);
        assert_eq!(config.dither, DitherMode::Ordered);
        assert_eq!(config.preset, RampPreset::Blocks);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.char_width, 10);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.toml");
        std::fs::write(&path, "[render]\nscale = 0.2\ndiversity = 0.3\n").unwrap();
        let cli = parse(&[
            "--procedural",
            "waves",
            "--config",
            path.to_str().unwrap(),
            "--diversity",
            "0.1",
        ]);
        let config = cli.resolve_config().unwrap();
        assert!((config.scale - 0.2).abs() < 1e-9);
        assert!((config.diversity - 0.1).abs() < 1e-6);
    }

    #[test]
    fn invert_flag_can_undo_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.toml");
        std::fs::write(&path, "[render]\ninvert = true\n").unwrap();
        let path = path.to_str().unwrap();

        let kept = parse(&["--procedural", "waves", "--config", path]);
        assert!(kept.resolve_config().unwrap().invert);
        let undone = parse(&["--procedural", "waves", "--config", path, "--invert", "false"]);
        assert!(!undone.resolve_config().unwrap().invert);
        let bare = parse(&["--invert", "--procedural", "waves"]);
        assert!(bare.resolve_config().unwrap().invert);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        assert!(Cli::try_parse_from(["asciiforge", "--procedural", "plasma"]).is_err());
        assert!(Cli::try_parse_from(["asciiforge", "--procedural", "waves", "--color-mode", "sepia"]).is_err());
    }

    #[test]
    fn exactly_one_source() {
        assert!(parse(&[]).validate_source().is_err());
        assert!(Cli::try_parse_from(["asciiforge", "--image", "a.png", "--procedural", "noise"]).is_err());
    }

    #[test]
    fn palette_flag_is_parsed() {
        let cli = parse(&["--procedural", "noise", "--color-mode", "palette", "--palette", "#000000,#ffffff"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.palette, vec![(0, 0, 0), (255, 255, 255)]);
    }

    #[test]
    fn out_of_range_flag_fails_validation() {
        let cli = parse(&["--procedural", "noise", "--dither-strength", "3"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(err.downcast_ref::<CoreError>().is_some());
    }
}
