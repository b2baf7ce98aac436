//! Page header: title, view toggle, reload and upload buttons

use crate::Theme;
use app_core::ViewMode;
use egui::{Color32, RichText, Ui};

/// Action returned from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    ToggleView,
    Reload,
    OpenUpload,
}

pub struct Header;

impl Header {
    pub fn ui(ui: &mut Ui, view_mode: ViewMode, image_count: usize, theme: &Theme) -> Option<HeaderAction> {
        let mut action = None;

        ui.add_space(20.0);
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                // Per-glyph gradient across the title
                let title = "Image Gallery";
                let len = title.chars().count().max(2) - 1;
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for (i, ch) in title.chars().enumerate() {
                        let color = theme.accent_mix(i as f32 / len as f32);
                        ui.label(RichText::new(ch.to_string()).size(32.0).strong().color(color));
                    }
                });
                ui.label(
                    RichText::new(format!("{} images · discover and share beautiful moments", image_count))
                        .color(theme.text_secondary),
                );
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let upload = egui::Button::new(RichText::new("⬆ Upload").color(Color32::WHITE).strong())
                    .fill(theme.accent)
                    .rounding(18.0);
                if ui.add(upload).clicked() {
                    action = Some(HeaderAction::OpenUpload);
                }

                let (icon, hint) = match view_mode {
                    ViewMode::Grid => ("▦", "Switch to masonry"),
                    ViewMode::Masonry => ("▤", "Switch to grid"),
                };
                if ui.button(RichText::new(icon).size(18.0)).on_hover_text(hint).clicked() {
                    action = Some(HeaderAction::ToggleView);
                }

                if ui.button(RichText::new("↻").size(18.0)).on_hover_text("Retry failed images").clicked() {
                    action = Some(HeaderAction::Reload);
                }
            });
        });
        ui.add_space(12.0);

        action
    }
}
