use std::fs;
use std::path::{Path, PathBuf};

use af_core::CoreError;

/// Extensions image reconnues.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Liste triée des images d'un dossier (non récursif).
///
/// # Errors
/// [`CoreError::Io`] si le dossier n'existe pas ou ne peut être lu.
///
/// # Example
/// ```no_run
/// use af_source::folder_batch::scan_images;
/// use std::path::Path;
/// let files = scan_images(Path::new("photos")).unwrap();
/// ```
pub fn scan_images(folder: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    files.sort();
    log::info!("{} image(s) trouvée(s) dans {}", files.len(), folder.display());
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}
