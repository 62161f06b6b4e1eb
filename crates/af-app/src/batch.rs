use std::fs;
use std::path::{Path, PathBuf};

use af_core::config::{OutputMode, RenderConfig};
use af_core::error::CoreError;
use af_source::folder_batch::scan_images;
use rayon::prelude::*;

use crate::pipeline::{RenderInput, render};

/// Bilan d'un traitement par lots.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

/// Default output folder for a batch over `folder`.
#[must_use]
pub fn default_out_dir(folder: &Path) -> PathBuf {
    folder.join("asciiforge-out")
}

/// Rend chaque image de `folder` dans `out_dir`, en parallèle.
///
/// Renders share nothing mutable. A failing file is logged and counted,
/// never stops the others. Outputs keep the full source file name
/// (`a.jpg` → `a.jpg.txt`), so sources sharing a stem never collide.
///
/// # Errors
/// Invalid configuration, unreadable input folder, an output folder that is
/// the input folder, or one that cannot be created.
///
/// # Example
/// ```no_run
/// use af_app::batch::run_batch;
/// use af_core::config::RenderConfig;
/// use std::path::Path;
/// let report = run_batch(Path::new("photos"), Path::new("out"), &RenderConfig::default()).unwrap();
/// println!("{} ok, {} failed", report.written.len(), report.failed.len());
/// ```
pub fn run_batch(folder: &Path, out_dir: &Path, config: &RenderConfig) -> Result<BatchReport, CoreError> {
    config.validate()?;
    let files = scan_images(folder)?;
    if out_dir.exists() && fs::canonicalize(out_dir)? == fs::canonicalize(folder)? {
        return Err(CoreError::InvalidValue {
            field: "batch_out",
            reason: format!("{} is the input folder", out_dir.display()),
        });
    }
    fs::create_dir_all(out_dir)?;

    let results: Vec<(PathBuf, Result<PathBuf, CoreError>)> = files
        .par_iter()
        .map(|path| (path.clone(), render_file(path, out_dir, config)))
        .collect();

    let mut report = BatchReport::default();
    for (input, result) in results {
        match result {
            Ok(output) => report.written.push(output),
            Err(e) => {
                log::warn!("échec {} : {e}", input.display());
                report.failed.push((input, e.to_string()));
            }
        }
    }
    log::info!(
        "lot terminé : {} rendu(s), {} échec(s)",
        report.written.len(),
        report.failed.len()
    );
    Ok(report)
}

fn render_file(path: &Path, out_dir: &Path, config: &RenderConfig) -> Result<PathBuf, CoreError> {
    let bytes = fs::read(path)?;
    let output = render(RenderInput::ImageBytes(bytes), config)?;

    let name = path.file_name().map_or_else(|| "render".into(), |s| s.to_string_lossy());
    let ext = match config.output_mode {
        OutputMode::Image => "png",
        OutputMode::Text => "txt",
    };
    let target = out_dir.join(format!("{name}.{ext}"));
    fs::write(&target, output.as_bytes())?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, w: u32, h: u32) {
        let img = image::RgbImage::from_fn(w, h, |x, y| image::Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        img.save(path).unwrap();
    }

    #[test]
    fn failures_are_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 32, 20);
        write_png(&dir.path().join("b.png"), 20, 32);
        fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        let out = dir.path().join("out");

        let config = RenderConfig {
            output_mode: OutputMode::Text,
            scale: 0.5,
            ..RenderConfig::default()
        };
        let report = run_batch(dir.path(), &out, &config).unwrap();

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("broken.png"));
        assert!(out.join("a.png.txt").is_file());
        assert!(out.join("b.png.txt").is_file());
    }

    #[test]
    fn same_stem_sources_get_distinct_outputs() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 24, 24);
        image::RgbImage::from_pixel(24, 24, image::Rgb([250, 250, 250]))
            .save(dir.path().join("a.jpg"))
            .unwrap();
        let out = dir.path().join("out");
        let config = RenderConfig {
            output_mode: OutputMode::Text,
            scale: 0.5,
            ..RenderConfig::default()
        };

        let report = run_batch(dir.path(), &out, &config).unwrap();

        assert_eq!(report.written.len(), 2);
        assert_ne!(report.written[0], report.written[1]);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
        assert!(out.join("a.jpg.txt").is_file());
        assert!(out.join("a.png.txt").is_file());
    }

    #[test]
    fn output_folder_must_differ_from_input() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 16, 16);
        let before = fs::read(dir.path().join("a.png")).unwrap();

        let err = run_batch(dir.path(), &dir.path().join("."), &RenderConfig::default()).unwrap_err();

        assert!(matches!(err, CoreError::InvalidValue { field: "batch_out", .. }));
        assert_eq!(fs::read(dir.path().join("a.png")).unwrap(), before);
    }

    #[test]
    fn invalid_config_stops_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = RenderConfig {
            diversity: -1.0,
            ..RenderConfig::default()
        };
        assert!(run_batch(dir.path(), &out, &config).is_err());
        assert!(!out.exists());
    }
}
