use crate::error::CoreError;

/// RGB triple, 8 bits per channel.
pub type Rgb = (u8, u8, u8);

/// Luminance perceptuelle BT.601 : `0.299 R + 0.587 G + 0.114 B`, tronquée.
///
/// # Example
/// ```
/// use af_core::color::luminance;
/// assert_eq!(luminance(255, 255, 255), 255);
/// assert_eq!(luminance(0, 0, 0), 0);
/// assert_eq!(luminance(255, 0, 0), 76);
/// ```
#[inline(always)]
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    // Fixed point, 1000 = 1.0
    let l = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    l.min(255) as u8
}

/// Parse a `#rrggbb` (or `rrggbb`) color.
///
/// # Errors
/// [`CoreError::InvalidValue`] on anything else.
///
/// # Example
/// ```
/// use af_core::color::parse_hex;
/// assert_eq!(parse_hex("#ff8000").unwrap(), (255, 128, 0));
/// assert!(parse_hex("#ff80").is_err());
/// ```
pub fn parse_hex(s: &str) -> Result<Rgb, CoreError> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || CoreError::InvalidValue {
        field: "palette",
        reason: format!("`{s}` is not a #rrggbb color"),
    };
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(bad());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Parse a comma or whitespace separated list of hex colors.
///
/// # Errors
/// Fails on the first malformed entry, or when the list is empty.
pub fn parse_palette(s: &str) -> Result<Vec<Rgb>, CoreError> {
    let colors = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(parse_hex)
        .collect::<Result<Vec<_>, _>>()?;
    if colors.is_empty() {
        return Err(CoreError::InvalidValue {
            field: "palette",
            reason: "palette has no colors".into(),
        });
    }
    Ok(colors)
}

/// Closest palette entry by squared RGB distance. Ties go to the earliest entry.
///
/// Returns the input unchanged for an empty palette.
///
/// # Example
/// ```
/// use af_core::color::nearest;
/// let palette = [(0, 0, 0), (255, 255, 255)];
/// assert_eq!(nearest((200, 190, 210), &palette), (255, 255, 255));
/// ```
#[must_use]
pub fn nearest(color: Rgb, palette: &[Rgb]) -> Rgb {
    let dist = |p: &Rgb| {
        let dr = i32::from(color.0) - i32::from(p.0);
        let dg = i32::from(color.1) - i32::from(p.1);
        let db = i32::from(color.2) - i32::from(p.2);
        dr * dr + dg * dg + db * db
    };
    palette
        .iter()
        .min_by_key(|p| dist(p))
        .copied()
        .unwrap_or(color)
}

/// Quantize a color onto the 6×6×6 cube.
#[must_use]
pub fn quantize_cube(color: Rgb) -> Rgb {
    let q = |c: u8| (c / 43) * 51;
    (q(color.0), q(color.1), q(color.2))
}

/// Linear interpolation between two colors, `t` in [0, 1].
#[must_use]
pub fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
