//! Reference-image resolution for image generation
//!
//! `--ref` arguments accept image files or directories of images. They are
//! flattened into an ordered list with MIME types, capped in count and size
//! before anything is read into the request body.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Maximum reference images per request.
pub const MAX_REFERENCE_IMAGES: usize = 10;

/// Per-image size limit in bytes.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

const SUPPORTED: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

/// One resolved reference image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub path: PathBuf,
    pub mime_type: &'static str,
}

/// MIME type for a supported extension (lowercase, without the dot).
fn mime_for_extension(ext: &str) -> Option<&'static str> {
    SUPPORTED
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn supported_list() -> String {
    let mut exts: Vec<String> = SUPPORTED.iter().map(|(e, _)| format!(".{e}")).collect();
    exts.dedup();
    exts.join(", ")
}

/// Resolve file/directory arguments into a flat reference-image list.
///
/// Directories are scanned (non-recursively, sorted for determinism) for
/// supported extensions; an empty directory is an error so a typo'd path
/// fails loudly. The flattened list is checked against the count and
/// per-file size limits.
pub fn resolve_reference_images(refs: &[PathBuf]) -> Result<Vec<ReferenceImage>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for reference in refs {
        if !reference.exists() {
            return Err(Error::not_found("Reference", reference.display()));
        }

        if reference.is_dir() {
            let mut matched: Vec<PathBuf> = std::fs::read_dir(reference)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && mime_for_extension(&extension_of(p)).is_some())
                .collect();
            matched.sort();

            if matched.is_empty() {
                return Err(Error::InvalidInput {
                    reason: format!(
                        "No supported images found in directory: {}",
                        reference.display()
                    ),
                });
            }
            paths.extend(matched);
        } else {
            let ext = extension_of(reference);
            if mime_for_extension(&ext).is_none() {
                return Err(Error::UnsupportedFormat {
                    format: format!(".{ext}"),
                    path: reference.display().to_string(),
                    supported: supported_list(),
                });
            }
            paths.push(reference.clone());
        }
    }

    if paths.len() > MAX_REFERENCE_IMAGES {
        return Err(Error::TooManyReferences {
            count: paths.len(),
            max: MAX_REFERENCE_IMAGES,
        });
    }

    paths
        .into_iter()
        .map(|path| {
            let size = std::fs::metadata(&path)?.len();
            if size > MAX_IMAGE_BYTES {
                return Err(Error::ImageTooLarge {
                    path: path.display().to_string(),
                    size_mb: size as f64 / 1024.0 / 1024.0,
                    limit_mb: MAX_IMAGE_BYTES / 1024 / 1024,
                });
            }
            // Extension already validated above.
            let mime_type = mime_for_extension(&extension_of(&path)).unwrap_or("image/png");
            Ok(ReferenceImage { path, mime_type })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        std::fs::write(path, b"fake image bytes").unwrap();
    }

    #[test]
    fn test_single_file_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cat.PNG");
        touch(&file);

        let resolved = resolve_reference_images(&[file.clone()]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].mime_type, "image/png");
        assert_eq!(resolved[0].path, file);
    }

    #[test]
    fn test_directory_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.jpg"));
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("notes.txt"));

        let resolved = resolve_reference_images(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = resolved
            .iter()
            .map(|r| r.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
        assert_eq!(resolved[1].mime_type, "image/jpeg");
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_reference_images(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(err.to_string().contains("No supported images found"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.pdf");
        touch(&file);

        let err = resolve_reference_images(&[file]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(err.to_string().contains(".png"));
    }

    #[test]
    fn test_missing_path() {
        let err =
            resolve_reference_images(&[PathBuf::from("/nonexistent/ref.png")]).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_too_many_references() {
        let dir = tempfile::tempdir().unwrap();
        let mut refs = Vec::new();
        for i in 0..=MAX_REFERENCE_IMAGES {
            let file = dir.path().join(format!("img{i:02}.png"));
            touch(&file);
            refs.push(file);
        }

        let err = resolve_reference_images(&refs).unwrap_err();
        assert!(matches!(
            err,
            Error::TooManyReferences { count: 11, max: 10 }
        ));
    }
}
