use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};

use crate::bitmap_font;

/// Polices système essayées dans l'ordre quand aucune police explicite n'est utilisable.
pub const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// First usable candidate, probed once per process.
static PROBED: LazyLock<Option<(PathBuf, Vec<u8>)>> = LazyLock::new(|| {
    let found = CANDIDATES.iter().map(PathBuf::from).find_map(|path| {
        let bytes = fs::read(&path).ok()?;
        match FontVec::try_from_vec(bytes.clone()) {
            Ok(_) => Some((path, bytes)),
            Err(e) => {
                log::warn!("police ignorée {}: {e}", path.display());
                None
            }
        }
    });
    match &found {
        Some((path, _)) => log::debug!("police système : {}", path.display()),
        None => log::debug!("aucune police système, police bitmap intégrée"),
    }
    found
});

/// Police retenue pour un rendu.
pub enum FontFace {
    /// Vector font parsed by `ab_glyph`.
    Outline {
        /// Parsed font.
        font: FontVec,
        /// Where it was loaded from.
        origin: PathBuf,
    },
    /// Built-in 8x8 bitmap font.
    Builtin,
}

impl FontFace {
    /// Short description for logs.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Outline { origin, .. } => origin.display().to_string(),
            Self::Builtin => "builtin 8x8".to_string(),
        }
    }

    /// Alpha mask of `ch` sized `cell_w × cell_h`, glyph drawn at `font_size` px.
    ///
    /// `None` when the font has no glyph for `ch`, or a glyph without an
    /// outline for a visible character.
    ///
    /// # Example
    /// ```
    /// use af_export::font::FontFace;
    /// let mask = FontFace::Builtin.rasterize('#', 14.0, 10, 18).unwrap();
    /// assert_eq!(mask.len(), 180);
    /// ```
    #[must_use]
    pub fn rasterize(&self, ch: char, font_size: f32, cell_w: u32, cell_h: u32) -> Option<Vec<u8>> {
        match self {
            Self::Builtin => bitmap_font::rasterize(ch, font_size, cell_w, cell_h),
            Self::Outline { font, .. } => outline_mask(font, ch, font_size, cell_w, cell_h),
        }
    }
}

fn outline_mask(font: &FontVec, ch: char, font_size: f32, cell_w: u32, cell_h: u32) -> Option<Vec<u8>> {
    // glyph_id 0 = .notdef
    let gid = font.glyph_id(ch);
    if gid.0 == 0 {
        return None;
    }

    let scale = PxScale::from(font_size);
    let ascent = font.as_scaled(scale).ascent();
    let glyph = gid.with_scale_and_position(scale, point(0.0, ascent));
    let mut mask = vec![0u8; cell_w as usize * cell_h as usize];

    match font.outline_glyph(glyph) {
        Some(outline) => {
            let bounds = outline.px_bounds();
            #[allow(clippy::cast_possible_wrap)]
            outline.draw(|x, y, v| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 && (px as u32) < cell_w && (py as u32) < cell_h {
                    let idx = py as usize * cell_w as usize + px as usize;
                    mask[idx] = mask[idx].max((v * 255.0).round() as u8);
                }
            });
        }
        None if ch.is_whitespace() => {}
        None => return None,
    }
    Some(mask)
}

/// Police pour un rendu : explicite → candidats système → bitmap intégrée.
///
/// Unreadable or unparsable files are logged and skipped; this never fails.
///
/// # Example
/// ```
/// use af_export::font::resolve;
/// use std::path::Path;
/// // A missing explicit font falls through to the next choice.
/// let face = resolve(Some(Path::new("/no/such/font.ttf")));
/// assert!(!face.name().is_empty());
/// ```
#[must_use]
pub fn resolve(explicit: Option<&Path>) -> FontFace {
    if let Some(path) = explicit {
        match load(path) {
            Ok(font) => {
                return FontFace::Outline {
                    font,
                    origin: path.to_path_buf(),
                };
            }
            Err(reason) => log::warn!("police {} inutilisable : {reason}", path.display()),
        }
    }

    if let Some((path, bytes)) = PROBED.as_ref()
        && let Ok(font) = FontVec::try_from_vec(bytes.clone())
    {
        return FontFace::Outline {
            font,
            origin: path.clone(),
        };
    }
    FontFace::Builtin
}

fn load(path: &Path) -> Result<FontVec, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    FontVec::try_from_vec(bytes).map_err(|e| e.to_string())
}
