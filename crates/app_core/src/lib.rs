//! Image Gallery core domain logic
//!
//! This crate contains:
//! - Image records and category filtering
//! - The gallery orchestrator and upload session state machine
//! - Command system
//! - Configuration
//! - Error types
//! - Background tasks (image loading, previews, downloads)
//! - Particle background simulation

pub mod record;
pub mod category;
pub mod config;
pub mod command;
pub mod error;
pub mod gallery;
pub mod upload;
pub mod particles;
pub mod imaging;
pub mod download;
pub mod tasks;

pub use record::{ImageId, ImageRecord, ImageSource, default_images};
pub use category::{Category, ALL_LABEL};
pub use config::{
    AppConfig, GeneralConfig, GalleryConfig, UploadConfig, ParticleConfig, DownloadConfig,
    ViewMode,
};
pub use command::{Command, CommandId, CommandParams, parse_binding};
pub use error::AppError;
pub use gallery::{Gallery, GalleryViewState, NavDirection, CommandOutcome};
pub use upload::{
    UploadSession, UploadPhase, UploadEntry, PreviewState, PreviewImage, PreviewJob,
    EntryId, SessionId,
};
pub use particles::{Particle, ParticleField, ParticleAnimation};
pub use imaging::DecodedImage;
pub use tasks::{TaskHub, TaskEvent};
