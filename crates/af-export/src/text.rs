use af_core::config::RenderConfig;
use af_core::error::CoreError;
use af_core::frame::{GlyphGrid, RenderOutput};
use af_core::traits::Compositor;

/// Sortie texte brute : une ligne par rangée, couleur ignorée.
///
/// # Example
/// ```
/// use af_core::config::RenderConfig;
/// use af_core::frame::{GlyphCell, GlyphGrid, RenderOutput};
/// use af_core::traits::Compositor;
/// use af_export::text::TextCompositor;
///
/// let mut grid = GlyphGrid::new(2, 2);
/// grid.set(1, 1, GlyphCell { ch: '#', index: 1, fg: (0, 0, 0) });
/// let out = TextCompositor.compose(&grid, &RenderConfig::default()).unwrap();
/// assert_eq!(out, RenderOutput::Text("  \n #".into()));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TextCompositor;

impl TextCompositor {
    /// Rows joined with `\n`, no trailing newline.
    #[must_use]
    pub fn to_text(grid: &GlyphGrid) -> String {
        let mut out = String::with_capacity(grid.cells.len() * 2 + grid.height as usize);
        for (y, row) in grid.rows().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.ch));
        }
        out
    }
}

impl Compositor for TextCompositor {
    fn compose(&self, grid: &GlyphGrid, _config: &RenderConfig) -> Result<RenderOutput, CoreError> {
        Ok(RenderOutput::Text(Self::to_text(grid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::frame::GlyphCell;

    #[test]
    fn rows_and_columns_line_up() {
        let mut grid = GlyphGrid::new(12, 5);
        for cell in &mut grid.cells {
            *cell = GlyphCell { ch: '░', index: 1, fg: (1, 2, 3) };
        }
        let text = TextCompositor::to_text(&grid);
        assert_eq!(text.matches('\n').count(), 4);
        assert!(!text.ends_with('\n'));
        assert!(text.lines().all(|l| l.chars().count() == 12));
    }

    #[test]
    fn single_cell_has_no_newline() {
        assert_eq!(TextCompositor::to_text(&GlyphGrid::new(1, 1)), " ");
    }
}
