//! Filesystem image source.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use blur_qa_core::{ImageInfo, ImageSource, LoadError};
use tracing::{debug, warn};

/// Extensions picked up when walking directories (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Images found under a set of files and directories.
///
/// The directory walk runs once, on first use, and yields files in sorted
/// path order so reports are reproducible between runs.
pub struct FsImageSource {
    roots: Vec<PathBuf>,
    recursive: bool,
    discovered: OnceLock<Vec<PathBuf>>,
}

impl FsImageSource {
    /// Source over `roots`. Directories are descended into only when
    /// `recursive` is set; files are taken as-is if their extension matches.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            roots,
            recursive,
            discovered: OnceLock::new(),
        }
    }

    /// Image files under the configured roots, sorted and without duplicates.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        self.discovered.get_or_init(|| {
            let mut found = Vec::new();
            for root in &self.roots {
                if root.is_dir() {
                    walk(root, self.recursive, &mut found);
                } else if !root.exists() {
                    warn!("Path does not exist: {}", root.display());
                } else if is_supported_image(root) {
                    found.push(root.clone());
                } else {
                    warn!("Not a supported image: {}", root.display());
                }
            }
            found.sort();
            found.dedup();
            debug!(count = found.len(), "discovered image files");
            found
        })
    }
}

/// Pushes every supported image below `root` onto `found`.
fn walk(root: &Path, recursive: bool, found: &mut Vec<PathBuf>) {
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read directory {}: {e}", dir.display());
                continue;
            }
        };

        for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if is_supported_image(&path) {
                found.push(path);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadError>> + Send + '_> {
        Box::new(self.files().iter().map(|path| {
            load_image(path).map_err(|e| LoadError::new(path.to_string_lossy(), e))
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.files().len())
    }
}

/// True when the extension is one of [`SUPPORTED_EXTENSIONS`].
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn load_image(path: &Path) -> Result<ImageInfo> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );

    Ok(ImageInfo::new(path.to_string_lossy(), image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_image() {
        for name in ["a.jpg", "a.JPEG", "a.png", "dir/a.Png"] {
            assert!(is_supported_image(Path::new(name)), "{name}");
        }
        for name in ["a.tiff", "a.webp", "a.txt", "a", ".png.bak"] {
            assert!(!is_supported_image(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let source = FsImageSource::new(vec![PathBuf::from("/nonexistent/blur-qa")], true);
        assert!(source.files().is_empty());
        assert_eq!(source.count_hint(), Some(0));
    }
}
