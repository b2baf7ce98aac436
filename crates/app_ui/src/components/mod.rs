//! UI Components

pub mod header;
pub mod filter_bar;
pub mod image_card;
pub mod gallery_grid;
pub mod lightbox;
pub mod upload_dialog;
pub mod particle_layer;
pub mod status_bar;

pub use header::{Header, HeaderAction};
pub use filter_bar::FilterBar;
pub use image_card::{ImageCard, CardAction, CardFit};
pub use gallery_grid::{GalleryGrid, GridAction, columns_for_width};
pub use lightbox::{Lightbox, LightboxAction, LightboxView, ScrollLock, ScrollGuard};
pub use upload_dialog::{UploadDialog, UploadAction};
pub use particle_layer::ParticleLayer;
pub use status_bar::{StatusBar, StatusInfo};
