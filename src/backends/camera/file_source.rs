// SPDX-License-Identifier: GPL-3.0-only

//! Still-image files as a frame source
//!
//! Stands in for a webcam when running headless: every snapshot reads the
//! next file of the list (wrapping around) and hands it over as an encoded
//! still, exactly like a preview screenshot.

use super::{FrameSnapshot, FrameSource};
use crate::constants::file_formats;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Frame source cycling through image files
#[derive(Debug)]
pub struct ImageFileSource {
    name: String,
    paths: Vec<PathBuf>,
    cursor: AtomicUsize,
}

impl ImageFileSource {
    /// Create a source from explicit file paths
    ///
    /// Directories in the list are expanded to the images they contain.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut files = Vec::new();
        for path in paths {
            if path.is_dir() {
                files.extend(list_images(&path));
            } else {
                files.push(path);
            }
        }

        info!(count = files.len(), "Image file source ready");

        Self {
            name: "image-files".to_string(),
            paths: files,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of files the source cycles through
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Option<FrameSnapshot> {
        if self.paths.is_empty() {
            return None;
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.paths.len();
        let path = &self.paths[index];

        match std::fs::read(path) {
            Ok(bytes) if !bytes.is_empty() => {
                debug!(path = %path.display(), size = bytes.len(), "Loaded snapshot from file");
                Some(FrameSnapshot::encoded(bytes))
            }
            Ok(_) => {
                warn!(path = %path.display(), "Snapshot file is empty");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read snapshot file");
                None
            }
        }
    }
}

/// List supported image files in a directory, sorted by name
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| file_formats::is_image_extension(&ext.to_string_lossy()))
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to list image directory");
            Vec::new()
        }
    };
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("photobooth-files-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_empty_source_has_no_frame() {
        let source = ImageFileSource::new(Vec::new());
        assert!(source.is_empty());
        assert!(source.snapshot().is_none());
    }

    #[test]
    fn test_missing_file_yields_no_frame() {
        let source = ImageFileSource::new(vec![PathBuf::from("/nonexistent/photobooth.jpg")]);
        assert!(source.snapshot().is_none());
    }

    #[test]
    fn test_directory_expansion_and_cycling() {
        let dir = scratch_dir();
        std::fs::write(dir.join("b.png"), b"second").unwrap();
        std::fs::write(dir.join("a.jpg"), b"first").unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

        let source = ImageFileSource::new(vec![dir.clone()]);
        assert_eq!(source.len(), 2);

        let sizes: Vec<usize> = (0..3)
            .map(|_| source.snapshot().map(|s| s.len()).unwrap_or(0))
            .collect();
        assert_eq!(sizes, vec![5, 6, 5]);

        std::fs::remove_dir_all(dir).ok();
    }
}
