//! Image Gallery file system layer
//!
//! Provides:
//! - Intake: reading picked/dropped files and keeping only images
//! - Portable file naming for downloads
//! - Staged saves that never leave partial files behind

mod intake;
mod sanitize;
mod save;

pub use intake::{PendingFile, read_candidates, pending_from_bytes, sniff_image_mime, SUPPORTED_EXTENSIONS};
pub use sanitize::{sanitize_file_stem, strip_extension, MAX_STEM_CHARS};
pub use save::{save_bytes, default_download_dir};

use std::path::PathBuf;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    #[error("No free file name for {0}")]
    NameExhausted(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
