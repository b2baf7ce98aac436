//! Full-window image viewer overlay

use crate::Theme;
use app_core::ImageRecord;
use egui::{Align2, Color32, Context, FontId, Id, Order, Pos2, Rect, Rounding, Sense, TextureHandle, Vec2};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Disables gallery scrolling while any guard is alive
#[derive(Clone, Default)]
pub struct ScrollLock {
    holders: Arc<AtomicUsize>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> ScrollGuard {
        self.holders.fetch_add(1, Ordering::SeqCst);
        ScrollGuard {
            holders: self.holders.clone(),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

/// Releases its hold on drop
pub struct ScrollGuard {
    holders: Arc<AtomicUsize>,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Action returned from the lightbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Close,
    Prev,
    Next,
    Download,
}

/// What the lightbox shows this frame
pub struct LightboxView<'a> {
    pub record: &'a ImageRecord,
    pub texture: Option<&'a TextureHandle>,
    /// e.g. `"2 of 5"`
    pub position: String,
    pub can_navigate: bool,
}

/// Open viewer; exists exactly as long as the viewer is shown
pub struct Lightbox {
    _scroll: ScrollGuard,
}

impl Lightbox {
    pub fn open(lock: &ScrollLock) -> Self {
        Self {
            _scroll: lock.acquire(),
        }
    }

    pub fn ui(&self, ctx: &Context, view: &LightboxView<'_>, theme: &Theme) -> Option<LightboxAction> {
        let screen = ctx.screen_rect();
        let mut action = None;

        egui::Area::new(Id::new("lightbox"))
            .order(Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.set_min_size(screen.size());

                // Backdrop; everything registered afterwards sits on top of it
                let backdrop = ui.interact(screen, Id::new("lightbox_backdrop"), Sense::click());
                ui.painter().rect_filled(screen, Rounding::ZERO, theme.overlay);
                if backdrop.clicked() {
                    action = Some(LightboxAction::Close);
                }

                let image_area = screen.shrink2(Vec2::new(96.0, 110.0));
                let image_rect = match view.texture {
                    Some(texture) => fit_rect(texture.size_vec2(), image_area),
                    None => Rect::from_center_size(image_area.center(), Vec2::splat(image_area.height().min(240.0))),
                };

                // Swallow clicks on the image itself
                ui.interact(image_rect, Id::new("lightbox_image"), Sense::click());
                match view.texture {
                    Some(texture) => {
                        egui::Image::from_texture(texture)
                            .rounding(Rounding::same(8.0))
                            .paint_at(ui, image_rect);
                    }
                    None => {
                        ui.painter().rect_filled(image_rect, Rounding::same(8.0), theme.primary);
                        ui.put(image_rect, egui::Spinner::new().size(32.0));
                    }
                }

                // Close button
                let close_rect = Rect::from_center_size(Pos2::new(screen.max.x - 40.0, screen.min.y + 40.0), Vec2::splat(40.0));
                if round_button(ui, close_rect, "lightbox_close", "✖", theme) {
                    action = Some(LightboxAction::Close);
                }

                if view.can_navigate {
                    let y = screen.center().y;
                    let prev = Rect::from_center_size(Pos2::new(screen.min.x + 48.0, y), Vec2::splat(48.0));
                    let next = Rect::from_center_size(Pos2::new(screen.max.x - 48.0, y), Vec2::splat(48.0));
                    if round_button(ui, prev, "lightbox_prev", "⏴", theme) {
                        action = Some(LightboxAction::Prev);
                    }
                    if round_button(ui, next, "lightbox_next", "⏵", theme) {
                        action = Some(LightboxAction::Next);
                    }
                }

                // Caption bar
                let caption = Rect::from_min_max(
                    Pos2::new(screen.min.x + 24.0, screen.max.y - 84.0),
                    Pos2::new(screen.max.x - 24.0, screen.max.y - 24.0),
                );
                ui.interact(caption, Id::new("lightbox_caption"), Sense::click());
                let painter = ui.painter();
                painter.rect_filled(caption, Rounding::same(12.0), Color32::from_black_alpha(140));
                painter.text(
                    caption.left_center() + Vec2::new(16.0, -9.0),
                    Align2::LEFT_CENTER,
                    &view.record.display_name,
                    FontId::proportional(18.0),
                    Color32::WHITE,
                );
                painter.text(
                    caption.left_center() + Vec2::new(16.0, 13.0),
                    Align2::LEFT_CENTER,
                    format!("{}  ·  {}", view.record.category, view.position),
                    FontId::proportional(13.0),
                    theme.text_secondary,
                );

                let download = Rect::from_center_size(caption.right_center() - Vec2::new(70.0, 0.0), Vec2::new(116.0, 36.0));
                let response = ui.interact(download, Id::new("lightbox_download"), Sense::click());
                let fill = if response.hovered() { theme.accent_alt } else { theme.accent };
                ui.painter().rect_filled(download, Rounding::same(18.0), fill);
                ui.painter().text(download.center(), Align2::CENTER_CENTER, "⬇ Download", FontId::proportional(14.0), Color32::WHITE);
                if response.clicked() {
                    action = Some(LightboxAction::Download);
                }
            });

        action
    }
}

fn round_button(ui: &egui::Ui, rect: Rect, id: &str, icon: &str, theme: &Theme) -> bool {
    let response = ui.interact(rect, Id::new(id), Sense::click());
    let fill = if response.hovered() {
        theme.accent.gamma_multiply(0.9)
    } else {
        Color32::from_white_alpha(40)
    };
    ui.painter().circle_filled(rect.center(), rect.width() / 2.0, fill);
    ui.painter().text(rect.center(), Align2::CENTER_CENTER, icon, FontId::proportional(rect.width() * 0.45), Color32::WHITE);
    response.clicked()
}

/// Largest rect with the image's aspect ratio that fits in `area`, centered
pub fn fit_rect(image: Vec2, area: Rect) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 {
        return area;
    }
    let scale = (area.width() / image.x).min(area.height() / image.y);
    Rect::from_center_size(area.center(), image * scale)
}
