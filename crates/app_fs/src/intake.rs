//! File intake for the upload dialog
//!
//! Files arrive either from the native picker or from drag-and-drop. Their
//! type is sniffed from content; anything that is not a decodable image
//! format is discarded.

use crate::{FsError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions offered by the file picker filter
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

/// A file accepted for upload, held entirely in memory
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// File name including extension, e.g. `beach.jpg`
    pub name: String,
    /// MIME type sniffed from the content, e.g. `image/jpeg`
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl PendingFile {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Sniff an image MIME type from magic bytes
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

/// Build a pending file from bytes already in memory (e.g. a drop carrying data)
pub fn pending_from_bytes(name: &str, bytes: Arc<[u8]>) -> Result<PendingFile> {
    match sniff_image_mime(&bytes) {
        Some(mime) => Ok(PendingFile {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes,
        }),
        None => Err(FsError::NotAnImage(name.to_string())),
    }
}

fn read_one(path: &Path) -> Result<PendingFile> {
    if !path.is_file() {
        return Err(FsError::NotFound(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| FsError::InvalidPath(path.to_path_buf()))?;

    let bytes: Arc<[u8]> = std::fs::read(path)?.into();
    pending_from_bytes(&name, bytes)
}

/// Read candidate paths, keeping images and silently skipping everything else.
///
/// Returns the accepted files in input order plus the number skipped.
pub fn read_candidates(paths: &[PathBuf]) -> (Vec<PendingFile>, usize) {
    let mut accepted = Vec::with_capacity(paths.len());
    let mut skipped = 0;

    for path in paths {
        match read_one(path) {
            Ok(file) => {
                tracing::debug!(name = %file.name, mime = %file.mime, size = file.len(), "Accepted file");
                accepted.push(file);
            }
            Err(e) => {
                tracing::debug!("Skipping {:?}: {}", path, e);
                skipped += 1;
            }
        }
    }

    (accepted, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG signature + IHDR chunk start; enough for format sniffing
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 16, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_sniff() {
        assert_eq!(sniff_image_mime(PNG_MAGIC), Some("image/png"));
        assert_eq!(sniff_image_mime(JPEG_MAGIC), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(b"hello world"), None);
    }

    #[test]
    fn test_pending_from_bytes_rejects_text() {
        let bytes: Arc<[u8]> = Arc::from(&b"plain text"[..]);
        assert!(matches!(pending_from_bytes("notes.txt", bytes), Err(FsError::NotAnImage(_))));
    }

    #[test]
    fn test_read_candidates_filters_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["a.png", "b.png", "c.jpg"] {
            let p = dir.path().join(name);
            let magic = if name.ends_with("jpg") { JPEG_MAGIC } else { PNG_MAGIC };
            std::fs::write(&p, magic).unwrap();
            paths.push(p);
        }
        let text = dir.path().join("readme.txt");
        std::fs::write(&text, b"not an image").unwrap();
        paths.insert(1, text);

        let (accepted, skipped) = read_candidates(&paths);
        assert_eq!(skipped, 1);
        let names: Vec<_> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.jpg"]);
        assert_eq!(accepted[2].mime, "image/jpeg");
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let (accepted, skipped) = read_candidates(&[PathBuf::from("/definitely/not/here.png")]);
        assert!(accepted.is_empty());
        assert_eq!(skipped, 1);
    }
}
