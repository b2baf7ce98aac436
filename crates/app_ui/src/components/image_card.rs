//! One gallery card: image, category badge and hover overlay

use crate::Theme;
use app_core::ImageRecord;
use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Stroke, TextureHandle, Ui, Vec2};

/// Action returned from card interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    View,
    Download,
}

/// How the image fills the card rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFit {
    /// Fill and crop the overflow (square grid cells)
    Cover,
    /// Card already has the image's aspect ratio (masonry)
    Stretch,
}

const ROUNDING: f32 = 12.0;
const BUTTON_SIZE: f32 = 34.0;

pub struct ImageCard;

impl ImageCard {
    /// Paint a card into `rect` and report clicks; `failed` replaces the skeleton with an error tile
    pub fn ui(
        ui: &mut Ui,
        rect: Rect,
        record: &ImageRecord,
        texture: Option<&TextureHandle>,
        failed: bool,
        fit: CardFit,
        theme: &Theme,
    ) -> Option<CardAction> {
        let id = ui.id().with(("card", record.id.as_str()));
        let response = ui.interact(rect, id, Sense::click());
        let hovered = ui.rect_contains_pointer(rect);

        let mut action = None;

        if ui.is_rect_visible(rect) {
            let painter = ui.painter_at(rect);
            let rounding = Rounding::same(ROUNDING);

            // Image or skeleton
            match texture {
                Some(texture) => {
                    let uv = match fit {
                        CardFit::Cover => cover_uv(texture.size_vec2(), rect.size()),
                        CardFit::Stretch => Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    };
                    let tint = if hovered {
                        Color32::from_gray(235)
                    } else {
                        Color32::WHITE
                    };
                    egui::Image::from_texture(texture)
                        .uv(uv)
                        .rounding(rounding)
                        .tint(tint)
                        .paint_at(ui, rect);
                }
                None if failed => {
                    painter.rect_filled(rect, rounding, theme.primary);
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        "⚠ Failed to load",
                        FontId::proportional(13.0),
                        theme.error,
                    );
                }
                None => {
                    let t = ui.input(|i| i.time) as f32;
                    let pulse = 0.5 + 0.5 * (t * 2.5).sin();
                    painter.rect_filled(rect, rounding, theme.primary.gamma_multiply(0.6 + 0.4 * pulse));
                }
            }

            // Category badge
            let badge_font = FontId::proportional(11.0);
            let galley = painter.layout_no_wrap(record.category.clone(), badge_font, theme.text);
            let badge = Rect::from_min_size(
                rect.min + Vec2::new(10.0, 10.0),
                galley.size() + Vec2::new(16.0, 8.0),
            );
            painter.rect_filled(badge, Rounding::same(badge.height() / 2.0), theme.accent.gamma_multiply(0.85));
            painter.galley(badge.min + Vec2::new(8.0, 4.0), galley, theme.text);

            if hovered {
                painter.rect_filled(rect, rounding, Color32::from_black_alpha(110));
                painter.rect_stroke(rect, rounding, Stroke::new(2.0, theme.accent_alt));

                painter.text(
                    Pos2::new(rect.min.x + 14.0, rect.max.y - 34.0),
                    Align2::LEFT_BOTTOM,
                    &record.display_name,
                    FontId::proportional(16.0),
                    Color32::WHITE,
                );
                painter.text(
                    Pos2::new(rect.min.x + 14.0, rect.max.y - 14.0),
                    Align2::LEFT_BOTTOM,
                    &record.category,
                    FontId::proportional(12.0),
                    theme.text_secondary,
                );

                let download_rect = Rect::from_min_size(
                    Pos2::new(rect.max.x - 10.0 - BUTTON_SIZE, rect.max.y - 10.0 - BUTTON_SIZE),
                    Vec2::splat(BUTTON_SIZE),
                );
                let view_rect = download_rect.translate(Vec2::new(-(BUTTON_SIZE + 8.0), 0.0));

                if overlay_button(ui, &painter, view_rect, id.with("view"), "👁", theme) {
                    action = Some(CardAction::View);
                }
                if overlay_button(ui, &painter, download_rect, id.with("download"), "⬇", theme) {
                    action = Some(CardAction::Download);
                }
            }
        }

        if action.is_none() && response.clicked() {
            action = Some(CardAction::View);
        }

        response.on_hover_text(&record.alt_text);
        action
    }
}

fn overlay_button(ui: &Ui, painter: &egui::Painter, rect: Rect, id: egui::Id, icon: &str, theme: &Theme) -> bool {
    let response = ui.interact(rect, id, Sense::click());
    let fill = if response.hovered() {
        theme.accent_alt
    } else {
        Color32::from_white_alpha(50)
    };
    painter.circle_filled(rect.center(), rect.width() / 2.0, fill);
    painter.text(rect.center(), Align2::CENTER_CENTER, icon, FontId::proportional(16.0), Color32::WHITE);
    response.clicked()
}

/// UV rectangle that crops `image` to fill `cell` without distortion
pub fn cover_uv(image: Vec2, cell: Vec2) -> Rect {
    if image.x <= 0.0 || image.y <= 0.0 || cell.x <= 0.0 || cell.y <= 0.0 {
        return Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    }

    let image_ratio = image.x / image.y;
    let cell_ratio = cell.x / cell.y;

    if image_ratio > cell_ratio {
        // Wider than the cell: crop left and right
        let visible = cell_ratio / image_ratio;
        let margin = (1.0 - visible) / 2.0;
        Rect::from_min_max(Pos2::new(margin, 0.0), Pos2::new(1.0 - margin, 1.0))
    } else {
        let visible = image_ratio / cell_ratio;
        let margin = (1.0 - visible) / 2.0;
        Rect::from_min_max(Pos2::new(0.0, margin), Pos2::new(1.0, 1.0 - margin))
    }
}
