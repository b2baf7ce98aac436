//! Background work and its completion events
//!
//! Everything slow runs on the tokio runtime. Results come back to the UI
//! thread as [`TaskEvent`]s over one crossbeam channel, drained once per frame.

use crate::download;
use crate::imaging::{self, DecodedImage};
use crate::upload::{PreviewJob, SessionId, EntryId};
use crate::{AppError, ImageId, ImageRecord};
use app_fs::PendingFile;
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;

/// Completion of a background task
#[derive(Debug)]
pub enum TaskEvent {
    ImageLoaded { id: ImageId, image: DecodedImage },
    ImageFailed { id: ImageId, error: AppError },
    PreviewReady {
        session: SessionId,
        entry: EntryId,
        result: Result<DecodedImage, AppError>,
    },
    FilesRead {
        session: SessionId,
        files: Vec<PendingFile>,
        skipped: usize,
    },
    UploadFinished { session: SessionId, records: Vec<ImageRecord> },
    DownloadFinished { name: String, result: Result<PathBuf, AppError> },
}

/// Spawns background work and reports back over a channel
#[derive(Clone)]
pub struct TaskHub {
    handle: Handle,
    client: reqwest::Client,
    events: Sender<TaskEvent>,
}

impl TaskHub {
    /// Create a hub and the receiving end of its event channel
    pub fn new(handle: Handle) -> Result<(Self, Receiver<TaskEvent>), AppError> {
        let (events, rx) = crossbeam_channel::unbounded();
        let client = download::build_client()?;
        Ok((Self { handle, client, events }, rx))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn send(events: &Sender<TaskEvent>, event: TaskEvent) {
        // The receiver only disappears during shutdown
        if events.send(event).is_err() {
            tracing::debug!("Task event dropped, receiver gone");
        }
    }

    /// Fetch and decode a card/lightbox image
    pub fn load_image(&self, record: &ImageRecord, max_edge: u32) {
        let client = self.client.clone();
        let events = self.events.clone();
        let id = record.id.clone();
        let source = record.source.clone();

        self.handle.spawn(async move {
            let result = async {
                let bytes = download::fetch_bytes(&client, &source).await?;
                tokio::task::spawn_blocking(move || imaging::decode_rgba(&bytes, max_edge))
                    .await
                    .map_err(|e| AppError::InvalidState(format!("decode task: {}", e)))?
            }
            .await;

            let event = match result {
                Ok(image) => TaskEvent::ImageLoaded { id, image },
                Err(error) => {
                    tracing::warn!(id = %id, source = ?source, "Image load failed: {}", error);
                    TaskEvent::ImageFailed { id, error }
                }
            };
            Self::send(&events, event);
        });
    }

    /// Read picked or dropped files off the UI thread, keeping only images
    pub fn read_files(&self, session: SessionId, paths: Vec<PathBuf>) {
        let events = self.events.clone();
        self.handle.spawn_blocking(move || {
            let (files, skipped) = app_fs::read_candidates(&paths);
            if skipped > 0 {
                tracing::debug!(?session, "Skipped {} non-image file(s)", skipped);
            }
            Self::send(&events, TaskEvent::FilesRead { session, files, skipped });
        });
    }

    /// Decode an upload preview off the UI thread
    pub fn decode_preview(&self, job: PreviewJob, edge: u32) {
        let events = self.events.clone();
        self.handle.spawn_blocking(move || {
            let result = imaging::decode_rgba(&job.bytes, edge);
            Self::send(
                &events,
                TaskEvent::PreviewReady {
                    session: job.session,
                    entry: job.entry,
                    result,
                },
            );
        });
    }

    /// Deliver `records` after the artificial upload delay
    pub fn simulate_upload(&self, session: SessionId, records: Vec<ImageRecord>, delay: Duration) {
        let events = self.events.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(?session, count = records.len(), "Simulated upload complete");
            Self::send(&events, TaskEvent::UploadFinished { session, records });
        });
    }

    /// Save `record` into `dir`
    pub fn download(&self, record: ImageRecord, dir: PathBuf, fallback_ext: String) {
        let client = self.client.clone();
        let events = self.events.clone();
        self.handle.spawn(async move {
            let result = download::download_image(&client, &record, dir, &fallback_ext).await;
            if let Err(e) = &result {
                tracing::warn!(id = %record.id, "Download failed: {}", e);
            }
            Self::send(
                &events,
                TaskEvent::DownloadFinished {
                    name: record.display_name.clone(),
                    result,
                },
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadSession;
    use std::sync::Arc;

    fn png(width: u32, height: u32) -> Arc<[u8]> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner().into()
    }

    fn recv(rx: &Receiver<TaskEvent>) -> TaskEvent {
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_preview_events_carry_entry_ids() {
        let (hub, rx) = TaskHub::new(Handle::current()).unwrap();
        let mut session = UploadSession::new("Nature");
        let jobs = session.add_files(vec![("a.png".to_string(), png(4, 4)), ("b.png".to_string(), png(2, 2))]);

        for job in jobs.clone() {
            hub.decode_preview(job, 160);
        }
        for _ in 0..2 {
            match recv(&rx) {
                TaskEvent::PreviewReady { session: sid, entry, result } => {
                    assert_eq!(sid, session.id());
                    session.preview_resolved(entry, result);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(session
            .entries()
            .iter()
            .all(|e| matches!(e.preview, crate::upload::PreviewState::Ready(_))));
    }

    fn write_files(dir: &std::path::Path) -> Vec<PathBuf> {
        let image = dir.join("beach.png");
        let text = dir.join("notes.txt");
        std::fs::write(&image, png(3, 3)).unwrap();
        std::fs::write(&text, b"not an image").unwrap();
        vec![image, text]
    }

    fn recv_files(rx: &Receiver<TaskEvent>) -> (SessionId, Vec<PendingFile>, usize) {
        match recv(rx) {
            TaskEvent::FilesRead { session, files, skipped } => (session, files, skipped),
            other => panic!("unexpected event {:?}", other),
        }
    }

    fn gallery() -> crate::Gallery {
        crate::Gallery::new(crate::default_images(), crate::ViewMode::Grid, "Nature")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_files_read_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let (hub, rx) = TaskHub::new(Handle::current()).unwrap();
        let mut gallery = gallery();
        gallery.open_upload();
        let sid = gallery.upload_session().unwrap().id();

        hub.read_files(sid, write_files(dir.path()));
        let (session, files, skipped) = recv_files(&rx);
        assert_eq!(skipped, 1);

        let jobs = gallery.accept_files(session, files);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "beach.png");
        assert_eq!(gallery.upload_session().unwrap().entries().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_files_for_closed_session_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (hub, rx) = TaskHub::new(Handle::current()).unwrap();
        let mut gallery = gallery();
        gallery.open_upload();
        let sid = gallery.upload_session().unwrap().id();

        hub.read_files(sid, write_files(dir.path()));
        gallery.close_upload();
        gallery.open_upload();

        let (session, files, _) = recv_files(&rx);
        assert_eq!(files.len(), 1);
        assert!(gallery.accept_files(session, files).is_empty());
        assert!(gallery.upload_session().unwrap().entries().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_simulated_upload_waits() {
        let (hub, rx) = TaskHub::new(Handle::current()).unwrap();
        let session = UploadSession::new("Nature");
        let started = std::time::Instant::now();

        hub.simulate_upload(session.id(), Vec::new(), Duration::from_millis(50));
        match recv(&rx) {
            TaskEvent::UploadFinished { session: sid, records } => {
                assert_eq!(sid, session.id());
                assert!(records.is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_inline_image_load() {
        let (hub, rx) = TaskHub::new(Handle::current()).unwrap();
        let record = ImageRecord {
            id: ImageId::new("u1"),
            source: crate::ImageSource::Inline { bytes: png(40, 20), mime: "image/png".into() },
            alt_text: "a.png".into(),
            category: "Art".into(),
            display_name: "a".into(),
            size_bytes: None,
        };

        hub.load_image(&record, 10);
        match recv(&rx) {
            TaskEvent::ImageLoaded { id, image } => {
                assert_eq!(id, ImageId::new("u1"));
                assert_eq!((image.width, image.height), (10, 5));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
