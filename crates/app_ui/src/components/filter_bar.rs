//! Category filter pills

use crate::Theme;
use app_core::Category;
use egui::{Color32, RichText, Ui};

pub struct FilterBar;

impl FilterBar {
    /// One pill per category; returns the clicked one
    pub fn ui(ui: &mut Ui, categories: &[Category], selected: &Category, theme: &Theme) -> Option<Category> {
        let mut clicked = None;

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing = egui::vec2(10.0, 10.0);
            for category in categories {
                let is_selected = category == selected;
                let (fill, text) = if is_selected {
                    (theme.accent_mix(0.5), Color32::WHITE)
                } else {
                    (theme.surface, theme.text_secondary)
                };

                let pill = egui::Button::new(RichText::new(category.label()).color(text))
                    .fill(fill)
                    .rounding(16.0)
                    .min_size(egui::vec2(64.0, 30.0));

                if ui.add(pill).clicked() && !is_selected {
                    clicked = Some(category.clone());
                }
            }
        });

        clicked
    }
}
