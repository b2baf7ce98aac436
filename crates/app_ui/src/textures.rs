//! GPU textures for gallery images, keyed by image id

use app_core::{DecodedImage, ImageId};
use egui::TextureHandle;
use std::collections::HashMap;

/// Load state of one image
pub enum TextureSlot {
    Loading,
    Ready { texture: TextureHandle, aspect: f32 },
    Failed,
}

#[derive(Default)]
pub struct TextureCache {
    slots: HashMap<ImageId, TextureSlot>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as loading. Returns true when the caller should start the load.
    pub fn request(&mut self, id: &ImageId) -> bool {
        if self.slots.contains_key(id) {
            return false;
        }
        self.slots.insert(id.clone(), TextureSlot::Loading);
        true
    }

    pub fn insert(&mut self, ctx: &egui::Context, id: ImageId, image: &DecodedImage) {
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width as usize, image.height as usize],
            &image.rgba,
        );
        let texture = ctx.load_texture(format!("image-{}", id), color_image, egui::TextureOptions::LINEAR);
        self.slots.insert(
            id,
            TextureSlot::Ready {
                texture,
                aspect: image.aspect(),
            },
        );
    }

    pub fn fail(&mut self, id: ImageId) {
        self.slots.insert(id, TextureSlot::Failed);
    }

    pub fn texture(&self, id: &ImageId) -> Option<&TextureHandle> {
        match self.slots.get(id) {
            Some(TextureSlot::Ready { texture, .. }) => Some(texture),
            _ => None,
        }
    }

    /// Height over width once loaded
    pub fn aspect(&self, id: &ImageId) -> Option<f32> {
        match self.slots.get(id) {
            Some(TextureSlot::Ready { aspect, .. }) => Some(*aspect),
            _ => None,
        }
    }

    pub fn is_failed(&self, id: &ImageId) -> bool {
        matches!(self.slots.get(id), Some(TextureSlot::Failed))
    }

    /// Forget failed entries so the next frame requests them again
    pub fn clear_failed(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| !matches!(slot, TextureSlot::Failed));
        before - self.slots.len()
    }
}
