//! Upload dialog session
//!
//! A session lives from opening the upload dialog until it closes. Files and
//! their previews are kept together in one [`UploadEntry`], addressed by a
//! stable [`EntryId`], so preview decodes that finish out of order always land
//! on the right file. Asynchronous completions carry the [`SessionId`] they
//! were started under and are dropped once that session is gone.

use crate::imaging::DecodedImage;
use crate::{AppError, ImageId, ImageRecord, ImageSource};
use app_fs::PendingFile;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identity of one upload dialog session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of one file within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// No files selected
    Idle,
    /// A drag hovers the drop zone
    Selecting,
    /// At least one file accepted
    Previewing,
    /// Simulated round-trip in flight
    Uploading,
    /// Batch handed off
    Done,
}

/// Decoded RGBA preview thumbnail
pub type PreviewImage = DecodedImage;

#[derive(Debug, Clone)]
pub enum PreviewState {
    Pending,
    Ready(PreviewImage),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct UploadEntry {
    pub id: EntryId,
    pub file: PendingFile,
    pub preview: PreviewState,
}

/// Request to decode a preview off the UI thread
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub session: SessionId,
    pub entry: EntryId,
    pub name: String,
    pub bytes: Arc<[u8]>,
}

pub struct UploadSession {
    id: SessionId,
    phase: UploadPhase,
    entries: Vec<UploadEntry>,
    category: String,
    drag_active: bool,
    next_entry: u64,
}

impl UploadSession {
    pub fn new(default_category: &str) -> Self {
        Self {
            id: SessionId::next(),
            phase: UploadPhase::Idle,
            entries: Vec::new(),
            category: default_category.to_string(),
            drag_active: false,
            next_entry: 0,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// Submit is possible with at least one file and nothing in flight
    pub fn can_submit(&self) -> bool {
        !self.entries.is_empty() && !self.is_uploading()
    }

    /// Label of the submit button
    pub fn submit_label(&self) -> String {
        if self.is_uploading() {
            "Uploading...".to_string()
        } else {
            format!("Upload {} image(s)", self.entries.len())
        }
    }

    /// Track whether a drag currently hovers the drop zone
    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
        match (self.phase, active) {
            (UploadPhase::Idle, true) => self.phase = UploadPhase::Selecting,
            (UploadPhase::Selecting, false) => self.phase = self.resting_phase(),
            _ => {}
        }
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    /// Add files given as name + bytes, discarding anything that is not an image.
    ///
    /// Returns one preview job per accepted file.
    pub fn add_files<I>(&mut self, files: I) -> Vec<PreviewJob>
    where
        I: IntoIterator<Item = (String, Arc<[u8]>)>,
    {
        let accepted: Vec<PendingFile> = files
            .into_iter()
            .filter_map(|(name, bytes)| match app_fs::pending_from_bytes(&name, bytes) {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::debug!("Discarding dropped file: {}", e);
                    None
                }
            })
            .collect();
        self.add_pending(accepted)
    }

    /// Add files already read and sniffed off the UI thread
    pub fn add_pending(&mut self, files: Vec<PendingFile>) -> Vec<PreviewJob> {
        if self.is_uploading() || self.phase == UploadPhase::Done {
            tracing::debug!("Ignoring {} file(s) while {:?}", files.len(), self.phase);
            return Vec::new();
        }

        let mut jobs = Vec::with_capacity(files.len());
        for file in files {
            let id = EntryId(self.next_entry);
            self.next_entry += 1;

            jobs.push(PreviewJob {
                session: self.id,
                entry: id,
                name: file.name.clone(),
                bytes: file.bytes.clone(),
            });
            self.entries.push(UploadEntry {
                id,
                file,
                preview: PreviewState::Pending,
            });
        }

        self.drag_active = false;
        self.phase = self.resting_phase();
        jobs
    }

    /// Attach a finished preview decode to its entry
    pub fn preview_resolved(&mut self, entry: EntryId, result: Result<PreviewImage, AppError>) {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry) else {
            tracing::debug!("Preview for removed entry {:?} ignored", entry);
            return;
        };

        slot.preview = match result {
            Ok(image) => PreviewState::Ready(image),
            Err(e) => {
                tracing::warn!("Preview failed for {}: {}", slot.file.name, e);
                PreviewState::Failed(e.user_message())
            }
        };
    }

    /// Remove a file together with its preview
    pub fn remove_entry(&mut self, entry: EntryId) -> bool {
        if self.is_uploading() {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|e| e.id != entry);
        let removed = self.entries.len() != before;
        if removed {
            self.phase = self.resting_phase();
        }
        removed
    }

    /// Remove by display position
    pub fn remove_at(&mut self, index: usize) -> bool {
        match self.entries.get(index) {
            Some(entry) => {
                let id = entry.id;
                self.remove_entry(id)
            }
            None => false,
        }
    }

    /// Build the batch and move to `Uploading`
    pub fn begin_upload(&mut self) -> Result<Vec<ImageRecord>, AppError> {
        if self.entries.is_empty() {
            return Err(AppError::InvalidState("no files selected".into()));
        }
        if self.is_uploading() {
            return Err(AppError::InvalidState("upload already in progress".into()));
        }

        let records = self
            .entries
            .iter()
            .map(|entry| ImageRecord {
                id: ImageId::generate(),
                source: ImageSource::Inline {
                    bytes: entry.file.bytes.clone(),
                    mime: entry.file.mime.clone(),
                },
                alt_text: entry.file.name.clone(),
                category: self.category.clone(),
                display_name: app_fs::strip_extension(&entry.file.name).to_string(),
                size_bytes: Some(entry.file.len()),
            })
            .collect();

        self.phase = UploadPhase::Uploading;
        tracing::info!(session = ?self.id, count = self.entries.len(), category = %self.category, "Upload started");
        Ok(records)
    }

    /// `Uploading -> Done`; entries are cleared
    pub fn finish_upload(&mut self) -> Result<(), AppError> {
        if !self.is_uploading() {
            return Err(AppError::InvalidState(format!("finish while {:?}", self.phase)));
        }
        self.entries.clear();
        self.phase = UploadPhase::Done;
        Ok(())
    }

    fn resting_phase(&self) -> UploadPhase {
        if self.entries.is_empty() {
            UploadPhase::Idle
        } else {
            UploadPhase::Previewing
        }
    }
}
