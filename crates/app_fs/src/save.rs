//! Staged saves
//!
//! Bytes are first written to a hidden `.part` file next to the destination
//! and renamed into place only once fully written. The staging file is a
//! guard: dropping it without [`StagedFile::persist`] deletes it, so no exit
//! path leaves a partial file behind.
//!
//! Final names are claimed with an exclusive create before the rename, so
//! concurrent saves of the same name end up in distinct files.

use crate::{FsError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Highest numeric suffix tried by [`reserve_target`]
const MAX_SUFFIX: u32 = 9999;

/// Attempts at finding an unused staging name
const STAGE_ATTEMPTS: u32 = 16;

static NEXT_STAGE: AtomicU64 = AtomicU64::new(0);

/// Transient staging file, removed on drop unless persisted
pub struct StagedFile {
    path: PathBuf,
    file: Option<std::fs::File>,
    persisted: bool,
}

impl StagedFile {
    /// Create a uniquely named staging file for `target` in the same directory
    pub fn create_for(target: &Path) -> Result<Self> {
        let dir = target
            .parent()
            .ok_or_else(|| FsError::InvalidPath(target.to_path_buf()))?;
        let name = target
            .file_name()
            .ok_or_else(|| FsError::InvalidPath(target.to_path_buf()))?
            .to_string_lossy();

        for _ in 0..STAGE_ATTEMPTS {
            let seq = NEXT_STAGE.fetch_add(1, Ordering::Relaxed);
            let path = dir.join(format!(".{}.{}-{}.part", name, std::process::id(), seq));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        path,
                        file: Some(file),
                        persisted: false,
                    })
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(FsError::NameExhausted(format!(".{}.part", name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_all(bytes)?),
            None => Err(FsError::InvalidPath(self.path.clone())),
        }
    }

    /// Flush and move the staged bytes onto the reserved `target`
    pub fn persist(mut self, mut target: ReservedTarget) -> Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        std::fs::rename(&self.path, &target.path)?;
        self.persisted = true;
        target.filled = true;
        Ok(target.path.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Close the handle first so removal succeeds on Windows
        self.file.take();
        if !self.persisted {
            remove_quietly(&self.path, "staging file");
        }
    }
}

/// Empty placeholder claiming a final file name; removed on drop unless filled
pub struct ReservedTarget {
    path: PathBuf,
    filled: bool,
}

impl ReservedTarget {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ReservedTarget {
    fn drop(&mut self) {
        if !self.filled {
            remove_quietly(&self.path, "reserved file");
        }
    }
}

fn remove_quietly(path: &Path, what: &str) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove {} {:?}: {}", what, path, e);
        }
    }
}

/// Claim the first free name among `stem.ext`, `stem (1).ext`, `stem (2).ext`, ...
///
/// The name is created exclusively, so two callers never get the same path.
pub fn reserve_target(dir: &Path, stem: &str, ext: &str) -> Result<ReservedTarget> {
    let candidates = std::iter::once(format!("{}.{}", stem, ext))
        .chain((1..=MAX_SUFFIX).map(|n| format!("{} ({}).{}", stem, n, ext)));

    for name in candidates {
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(ReservedTarget { path, filled: false }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(FsError::NameExhausted(format!("{}.{}", stem, ext)))
}

/// Write `bytes` to a fresh file named after `stem`/`ext` inside `dir`
pub fn save_bytes(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut staged = StagedFile::create_for(&dir.join(format!("{}.{}", stem, ext)))?;
    staged.write_all(bytes)?;

    let target = reserve_target(dir, stem, ext)?;
    let saved = staged.persist(target)?;

    tracing::debug!(path = %saved.display(), size = bytes.len(), "Saved file");
    Ok(saved)
}

/// Platform download directory, falling back to `./downloads`
pub fn default_download_dir() -> PathBuf {
    dirs_next::download_dir().unwrap_or_else(|| PathBuf::from("./downloads"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_save_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = save_bytes(dir.path(), "sunset", "jpg", b"one").unwrap();
        let second = save_bytes(dir.path(), "sunset", "jpg", b"two").unwrap();

        assert_eq!(first.file_name().unwrap(), "sunset.jpg");
        assert_eq!(second.file_name().unwrap(), "sunset (1).jpg");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(entries(dir.path()), vec!["sunset (1).jpg", "sunset.jpg"]);
    }

    #[test]
    fn test_dropped_stage_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wave.png");
        {
            let mut staged = StagedFile::create_for(&target).unwrap();
            staged.write_all(b"partial").unwrap();
            assert!(staged.path().exists());
        }
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_staging_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wave.png");
        let a = StagedFile::create_for(&target).unwrap();
        let b = StagedFile::create_for(&target).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_reservation_claims_name() {
        let dir = tempfile::tempdir().unwrap();
        let first = reserve_target(dir.path(), "wave", "png").unwrap();
        let second = reserve_target(dir.path(), "wave", "png").unwrap();
        assert_eq!(first.path().file_name().unwrap(), "wave.png");
        assert_eq!(second.path().file_name().unwrap(), "wave (1).png");

        drop(first);
        drop(second);
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_persist_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut staged = StagedFile::create_for(&dir.path().join("wave.png")).unwrap();
        staged.write_all(b"bytes").unwrap();
        let target = reserve_target(dir.path(), "wave", "png").unwrap();

        // Staged bytes vanish before the rename
        std::fs::remove_file(staged.path()).unwrap();
        assert!(staged.persist(target).is_err());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_concurrent_saves_never_collide() {
        use std::sync::{Arc, Barrier};

        const WORKERS: usize = 4;
        for _ in 0..25 {
            let dir = Arc::new(tempfile::tempdir().unwrap());
            let barrier = Arc::new(Barrier::new(WORKERS));

            let handles: Vec<_> = (0..WORKERS)
                .map(|i| {
                    let dir = dir.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        save_bytes(dir.path(), "Golden Sunset", "jpg", format!("worker {}", i).as_bytes())
                    })
                })
                .collect();

            let mut saved: Vec<PathBuf> = handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect();
            saved.sort();
            saved.dedup();
            assert_eq!(saved.len(), WORKERS);

            let mut contents: Vec<Vec<u8>> = saved.iter().map(|p| std::fs::read(p).unwrap()).collect();
            contents.sort();
            let expected: Vec<Vec<u8>> = (0..WORKERS).map(|i| format!("worker {}", i).into_bytes()).collect();
            assert_eq!(contents, expected);
            assert!(entries(dir.path()).iter().all(|n| !n.ends_with(".part")));
        }
    }
}
