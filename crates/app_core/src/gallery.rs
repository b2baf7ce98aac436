//! Gallery orchestrator
//!
//! Owns the image collection and all view state. The UI reads from it and
//! reports user actions back; background completions are applied here too.
//! Only this type mutates the collection.

use crate::upload::{EntryId, PreviewImage, PreviewJob, SessionId, UploadSession};
use app_fs::PendingFile;
use crate::{AppError, Category, Command, CommandId, ImageId, ImageRecord, ViewMode};

/// Lightbox navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Prev,
    Next,
}

/// Transient view state
#[derive(Debug, Clone, Default)]
pub struct GalleryViewState {
    pub selected_category: Category,
    pub view_mode: ViewMode,
    /// Index into the filtered list, `Some` while the lightbox is open
    pub lightbox_index: Option<usize>,
    pub upload_dialog_open: bool,
}

/// Result of executing a command
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// Not applicable in the current state
    Ignored,
    Handled,
    /// The caller should start a download
    Download(ImageRecord),
    /// The caller should retry failed image loads
    Reload,
    Exit,
}

pub struct Gallery {
    images: Vec<ImageRecord>,
    categories: Vec<Category>,
    /// Indices into `images` admitted by the selected category
    filtered: Vec<usize>,
    view: GalleryViewState,
    upload: Option<UploadSession>,
    upload_category: String,
}

impl Gallery {
    pub fn new(images: Vec<ImageRecord>, view_mode: ViewMode, upload_category: &str) -> Self {
        let mut gallery = Self {
            categories: Category::derive(&images),
            images,
            filtered: Vec::new(),
            view: GalleryViewState {
                view_mode,
                ..Default::default()
            },
            upload: None,
            upload_category: upload_category.to_string(),
        };
        gallery.refilter();
        gallery
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn view(&self) -> &GalleryViewState {
        &self.view
    }

    pub fn selected_category(&self) -> &Category {
        &self.view.selected_category
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view.view_mode
    }

    /// Images admitted by the selected category, in collection order
    pub fn filtered(&self) -> Vec<&ImageRecord> {
        self.filtered.iter().map(|&i| &self.images[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    fn refilter(&mut self) {
        let category = &self.view.selected_category;
        self.filtered = self
            .images
            .iter()
            .enumerate()
            .filter(|(_, image)| category.matches(image))
            .map(|(i, _)| i)
            .collect();
    }

    // ========================================
    // Filtering & view mode
    // ========================================

    pub fn set_category(&mut self, category: Category) -> Result<(), AppError> {
        if !self.categories.contains(&category) {
            return Err(AppError::UnknownCategory(category.label().to_string()));
        }
        if category == self.view.selected_category {
            return Ok(());
        }

        tracing::debug!("Category -> {}", category);
        self.view.selected_category = category;
        self.view.lightbox_index = None;
        self.refilter();
        Ok(())
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view.view_mode = self.view.view_mode.toggled();
        self.view.view_mode
    }

    // ========================================
    // Lightbox
    // ========================================

    /// Open the lightbox on `id`, which must be in the filtered list
    pub fn open_viewer(&mut self, id: &ImageId) -> Result<usize, AppError> {
        let index = self
            .filtered
            .iter()
            .position(|&i| self.images[i].id == *id)
            .ok_or_else(|| AppError::NotInView(id.to_string()))?;

        self.view.lightbox_index = Some(index);
        Ok(index)
    }

    pub fn close_viewer(&mut self) {
        self.view.lightbox_index = None;
    }

    pub fn is_viewer_open(&self) -> bool {
        self.view.lightbox_index.is_some()
    }

    /// Step through the filtered list with wraparound; returns whether the index moved
    pub fn navigate(&mut self, direction: NavDirection) -> bool {
        let len = self.filtered.len();
        let Some(index) = self.view.lightbox_index else {
            return false;
        };
        if len <= 1 {
            return false;
        }

        let next = match direction {
            NavDirection::Next => (index + 1) % len,
            NavDirection::Prev => (index + len - 1) % len,
        };
        self.view.lightbox_index = Some(next);
        true
    }

    /// Lightbox direction buttons are shown only with something to step to
    pub fn can_navigate(&self) -> bool {
        self.filtered.len() > 1
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.view
            .lightbox_index
            .and_then(|i| self.filtered.get(i))
            .map(|&i| &self.images[i])
    }

    /// `"{i+1} of {n}"` for the open lightbox
    pub fn position_label(&self) -> Option<String> {
        self.view
            .lightbox_index
            .map(|i| format!("{} of {}", i + 1, self.filtered.len()))
    }

    // ========================================
    // Upload
    // ========================================

    pub fn open_upload(&mut self) {
        if self.upload.is_none() {
            self.upload = Some(UploadSession::new(&self.upload_category));
        }
        self.view.upload_dialog_open = true;
    }

    /// Close the dialog; an upload in flight is discarded
    pub fn close_upload(&mut self) {
        if let Some(session) = self.upload.take() {
            if session.is_uploading() {
                tracing::info!(session = ?session.id(), "Upload dialog closed, discarding batch");
            }
        }
        self.view.upload_dialog_open = false;
    }

    pub fn is_upload_open(&self) -> bool {
        self.view.upload_dialog_open
    }

    pub fn upload_session(&self) -> Option<&UploadSession> {
        self.upload.as_ref()
    }

    pub fn upload_session_mut(&mut self) -> Option<&mut UploadSession> {
        self.upload.as_mut()
    }

    /// Start the open session's upload; returns the batch to deliver later
    pub fn begin_upload(&mut self) -> Result<(SessionId, Vec<ImageRecord>), AppError> {
        let session = self
            .upload
            .as_mut()
            .ok_or_else(|| AppError::InvalidState("upload dialog is closed".into()))?;
        let records = session.begin_upload()?;
        Ok((session.id(), records))
    }

    fn live_session(&mut self, id: SessionId) -> Option<&mut UploadSession> {
        self.upload.as_mut().filter(|s| s.id() == id)
    }

    /// Hand files read in the background to their session.
    ///
    /// Returns the preview jobs to start; empty when the session is gone.
    pub fn accept_files(&mut self, session: SessionId, files: Vec<PendingFile>) -> Vec<PreviewJob> {
        match self.live_session(session) {
            Some(live) => live.add_pending(files),
            None => {
                tracing::debug!(?session, count = files.len(), "Files for closed session dropped");
                Vec::new()
            }
        }
    }

    /// Route a preview decode to its session; stale sessions are ignored
    pub fn apply_preview(&mut self, session: SessionId, entry: EntryId, result: Result<PreviewImage, AppError>) {
        match self.live_session(session) {
            Some(live) => live.preview_resolved(entry, result),
            None => tracing::debug!(?session, "Preview for closed session dropped"),
        }
    }

    /// Deliver a finished batch. Returns false when its session is gone.
    pub fn complete_upload(&mut self, session: SessionId, records: Vec<ImageRecord>) -> bool {
        let Some(live) = self.live_session(session) else {
            tracing::debug!(?session, count = records.len(), "Upload for closed session dropped");
            return false;
        };
        if let Err(e) = live.finish_upload() {
            tracing::warn!("Upload completion rejected: {}", e);
            return false;
        }

        self.ingest_uploaded(records);
        true
    }

    /// Append new images, refresh derived state and close the upload dialog
    pub fn ingest_uploaded(&mut self, new_images: Vec<ImageRecord>) {
        tracing::info!(count = new_images.len(), "Ingesting uploaded images");
        self.images.extend(new_images);
        self.categories = Category::derive(&self.images);
        self.refilter();
        self.close_upload();
    }

    // ========================================
    // Commands
    // ========================================

    pub fn execute(&mut self, command: &Command) -> Result<CommandOutcome, AppError> {
        let outcome = match command.id.as_str() {
            CommandId::GALLERY_TOGGLE_VIEW => {
                self.toggle_view_mode();
                CommandOutcome::Handled
            }
            CommandId::GALLERY_FILTER => {
                let label = command
                    .params
                    .string_value
                    .as_deref()
                    .ok_or_else(|| AppError::InvalidState("filter needs a category".into()))?;
                self.set_category(Category::from_label(label))?;
                CommandOutcome::Handled
            }
            CommandId::GALLERY_RELOAD => CommandOutcome::Reload,
            CommandId::LIGHTBOX_CLOSE if self.is_viewer_open() => {
                self.close_viewer();
                CommandOutcome::Handled
            }
            CommandId::LIGHTBOX_PREV if self.is_viewer_open() => {
                self.navigate(NavDirection::Prev);
                CommandOutcome::Handled
            }
            CommandId::LIGHTBOX_NEXT if self.is_viewer_open() => {
                self.navigate(NavDirection::Next);
                CommandOutcome::Handled
            }
            CommandId::LIGHTBOX_DOWNLOAD => match self.current_image() {
                Some(image) => CommandOutcome::Download(image.clone()),
                None => CommandOutcome::Ignored,
            },
            CommandId::UPLOAD_OPEN => {
                self.open_upload();
                CommandOutcome::Handled
            }
            CommandId::UPLOAD_CLOSE if self.is_upload_open() => {
                self.close_upload();
                CommandOutcome::Handled
            }
            CommandId::APP_EXIT => CommandOutcome::Exit,
            _ => CommandOutcome::Ignored,
        };

        tracing::trace!(command = %command.id.as_str(), ?outcome, "Command executed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{default_images, ImageSource};
    use std::sync::Arc;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R'];

    fn seeded() -> Gallery {
        Gallery::new(default_images(), ViewMode::Grid, "Nature")
    }

    fn record(id: &str, category: &str) -> ImageRecord {
        ImageRecord::remote(id, "https://example.com/x.jpg", id, category, id)
    }

    fn ids(gallery: &Gallery) -> Vec<String> {
        gallery.filtered().iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_filter_is_ordered_subsequence() {
        let mut gallery = seeded();
        assert_eq!(gallery.filtered_len(), 8);

        for category in gallery.categories().to_vec() {
            gallery.set_category(category.clone()).unwrap();
            let expected: Vec<String> = default_images()
                .iter()
                .filter(|r| category.matches(r))
                .map(|r| r.id.to_string())
                .collect();
            assert_eq!(ids(&gallery), expected);
        }

        gallery.set_category(Category::All).unwrap();
        assert_eq!(ids(&gallery), vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut gallery = seeded();
        gallery.set_category(Category::from_label("Art")).unwrap();
        let err = gallery.set_category(Category::from_label("Space")).unwrap_err();
        assert!(matches!(err, AppError::UnknownCategory(ref c) if c == "Space"));
        assert_eq!(gallery.selected_category().label(), "Art");
        assert_eq!(gallery.filtered_len(), 2);
    }

    #[test]
    fn test_seed_scenario() {
        let mut gallery = seeded();
        gallery.set_category(Category::from_label("Urban")).unwrap();
        assert_eq!(gallery.filtered_len(), 2);

        let first = gallery.filtered()[0].id.clone();
        gallery.open_viewer(&first).unwrap();
        assert_eq!(gallery.position_label().as_deref(), Some("1 of 2"));

        gallery.navigate(NavDirection::Next);
        assert_eq!(gallery.position_label().as_deref(), Some("2 of 2"));
        assert_eq!(gallery.current_image().unwrap().display_name, "Modern Architecture");

        gallery.navigate(NavDirection::Next);
        assert_eq!(gallery.position_label().as_deref(), Some("1 of 2"));
    }

    #[test]
    fn test_next_then_prev_round_trips() {
        let mut gallery = seeded();
        for start in 0..8 {
            let id = gallery.filtered()[start].id.clone();
            gallery.open_viewer(&id).unwrap();
            assert!(gallery.navigate(NavDirection::Next));
            assert!(gallery.navigate(NavDirection::Prev));
            assert_eq!(gallery.view().lightbox_index, Some(start));
        }
    }

    #[test]
    fn test_prev_wraps_to_end() {
        let mut gallery = seeded();
        gallery.open_viewer(&ImageId::new("1")).unwrap();
        gallery.navigate(NavDirection::Prev);
        assert_eq!(gallery.position_label().as_deref(), Some("8 of 8"));
    }

    #[test]
    fn test_single_item_navigation_is_noop() {
        let mut gallery = Gallery::new(vec![record("only", "Art")], ViewMode::Grid, "Nature");
        gallery.open_viewer(&ImageId::new("only")).unwrap();
        assert!(!gallery.can_navigate());
        assert!(!gallery.navigate(NavDirection::Next));
        assert!(!gallery.navigate(NavDirection::Prev));
        assert_eq!(gallery.view().lightbox_index, Some(0));
    }

    #[test]
    fn test_navigate_closed_viewer_is_noop() {
        let mut gallery = seeded();
        assert!(!gallery.navigate(NavDirection::Next));
        assert!(gallery.current_image().is_none());
        assert!(gallery.position_label().is_none());
    }

    #[test]
    fn test_open_viewer_outside_filter() {
        let mut gallery = seeded();
        gallery.set_category(Category::from_label("Art")).unwrap();
        let err = gallery.open_viewer(&ImageId::new("1")).unwrap_err();
        assert!(matches!(err, AppError::NotInView(_)));
        assert!(!gallery.is_viewer_open());
    }

    #[test]
    fn test_category_change_closes_viewer() {
        let mut gallery = seeded();
        gallery.open_viewer(&ImageId::new("8")).unwrap();
        gallery.set_category(Category::from_label("Art")).unwrap();
        assert!(!gallery.is_viewer_open());
    }

    #[test]
    fn test_toggle_keeps_filter() {
        let mut gallery = seeded();
        gallery.set_category(Category::from_label("Nature")).unwrap();
        let before = ids(&gallery);
        assert_eq!(gallery.toggle_view_mode(), ViewMode::Masonry);
        assert_eq!(ids(&gallery), before);
        assert_eq!(gallery.toggle_view_mode(), ViewMode::Grid);
    }

    #[test]
    fn test_ingest_appends_and_closes_dialog() {
        let mut gallery = Gallery::new(vec![record("x", "Art"), record("y", "Art")], ViewMode::Grid, "Nature");
        gallery.open_upload();

        gallery.ingest_uploaded(vec![record("a", "Food"), record("b", "Art")]);
        assert_eq!(ids(&gallery), vec!["x", "y", "a", "b"]);
        assert!(!gallery.is_upload_open());
        assert!(gallery.upload_session().is_none());

        let labels: Vec<_> = gallery.categories().iter().map(|c| c.label().to_string()).collect();
        assert_eq!(labels, vec!["All", "Art", "Food"]);
    }

    #[test]
    fn test_upload_flow() {
        let mut gallery = seeded();
        gallery.open_upload();
        let session = gallery.upload_session_mut().unwrap();
        session.set_category("People");
        session.add_files(vec![("me.png".to_string(), Arc::from(PNG))]);

        let (sid, records) = gallery.begin_upload().unwrap();
        assert!(gallery.complete_upload(sid, records));

        assert_eq!(gallery.images().len(), 9);
        let added = &gallery.images()[8];
        assert_eq!(added.category, "People");
        assert!(matches!(added.source, ImageSource::Inline { .. }));
        assert!(gallery.categories().contains(&Category::from_label("People")));
        assert!(!gallery.is_upload_open());

        // A reopened dialog starts empty
        gallery.open_upload();
        assert!(gallery.upload_session().unwrap().entries().is_empty());
    }

    #[test]
    fn test_closing_mid_upload_discards_batch() {
        let mut gallery = seeded();
        gallery.open_upload();
        gallery
            .upload_session_mut()
            .unwrap()
            .add_files(vec![("me.png".to_string(), Arc::from(PNG))]);
        let (sid, records) = gallery.begin_upload().unwrap();

        gallery.close_upload();
        gallery.open_upload();
        assert!(!gallery.complete_upload(sid, records));
        assert_eq!(gallery.images().len(), 8);
        assert!(gallery.is_upload_open());
    }

    #[test]
    fn test_execute_lightbox_commands_need_open_viewer() {
        let mut gallery = seeded();
        let close = Command::new(CommandId::LIGHTBOX_CLOSE);
        assert!(matches!(gallery.execute(&close).unwrap(), CommandOutcome::Ignored));

        gallery.open_viewer(&ImageId::new("2")).unwrap();
        let next = Command::new(CommandId::LIGHTBOX_NEXT);
        assert!(matches!(gallery.execute(&next).unwrap(), CommandOutcome::Handled));
        assert_eq!(gallery.current_image().unwrap().id, ImageId::new("3"));

        match gallery.execute(&Command::new(CommandId::LIGHTBOX_DOWNLOAD)).unwrap() {
            CommandOutcome::Download(image) => assert_eq!(image.id, ImageId::new("3")),
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(matches!(gallery.execute(&close).unwrap(), CommandOutcome::Handled));
        assert!(!gallery.is_viewer_open());
    }

    #[test]
    fn test_execute_filter_and_toggle() {
        let mut gallery = seeded();
        let filter = Command::new(CommandId::GALLERY_FILTER).with_string("Urban");
        gallery.execute(&filter).unwrap();
        assert_eq!(gallery.filtered_len(), 2);

        gallery.execute(&Command::new(CommandId::GALLERY_TOGGLE_VIEW)).unwrap();
        assert_eq!(gallery.view_mode(), ViewMode::Masonry);

        let bad = Command::new(CommandId::GALLERY_FILTER).with_string("Space");
        assert!(gallery.execute(&bad).is_err());
        assert!(matches!(gallery.execute(&Command::new(CommandId::APP_EXIT)).unwrap(), CommandOutcome::Exit));
    }
}
