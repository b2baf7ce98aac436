//! Upload dialog: drop zone, file picker, previews and category choice

use crate::Theme;
use app_core::{EntryId, PreviewState, UploadSession};
use egui::{Align2, Color32, ComboBox, Context, RichText, Rounding, Sense, Stroke, TextureHandle, Vec2};
use std::collections::HashMap;
use std::path::PathBuf;

/// Action returned from the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadAction {
    Close,
    Submit,
    FilesChosen(Vec<PathBuf>),
    Remove(EntryId),
    CategoryChanged(String),
}

const PREVIEW_EDGE: f32 = 96.0;

/// Dialog chrome plus the preview textures of the current session
#[derive(Default)]
pub struct UploadDialog {
    previews: HashMap<EntryId, TextureHandle>,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop textures of entries that no longer exist
    fn sync_previews(&mut self, ctx: &Context, session: &UploadSession) {
        self.previews
            .retain(|id, _| session.entries().iter().any(|e| e.id == *id));

        for entry in session.entries() {
            if self.previews.contains_key(&entry.id) {
                continue;
            }
            if let PreviewState::Ready(image) = &entry.preview {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [image.width as usize, image.height as usize],
                    &image.rgba,
                );
                let texture = ctx.load_texture(
                    format!("preview-{:?}", entry.id),
                    color_image,
                    egui::TextureOptions::LINEAR,
                );
                self.previews.insert(entry.id, texture);
            }
        }
    }

    /// Forget all previews (dialog closed)
    pub fn reset(&mut self) {
        self.previews.clear();
    }

    pub fn ui(
        &mut self,
        ctx: &Context,
        session: &UploadSession,
        categories: &[String],
        theme: &Theme,
    ) -> Option<UploadAction> {
        self.sync_previews(ctx, session);

        let mut action = None;
        let uploading = session.is_uploading();

        // Dim the gallery behind the dialog
        egui::Area::new(egui::Id::new("upload_backdrop"))
            .order(egui::Order::Middle)
            .fixed_pos(ctx.screen_rect().min)
            .show(ctx, |ui| {
                let screen = ctx.screen_rect();
                ui.interact(screen, egui::Id::new("upload_backdrop_area"), Sense::click());
                ui.painter().rect_filled(screen, Rounding::ZERO, Color32::from_black_alpha(160));
            });

        egui::Window::new("Upload Images")
            .order(egui::Order::Foreground)
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .fixed_size(Vec2::new(560.0, 0.0))
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Upload Images").color(theme.text).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add_enabled(!uploading, egui::Button::new("✖").frame(false)).clicked() {
                            action = Some(UploadAction::Close);
                        }
                    });
                });
                ui.add_space(12.0);

                // Drop zone
                let (zone, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 150.0), Sense::hover());
                let active = session.is_drag_active();
                let stroke_color = if active { theme.accent_alt } else { theme.text_secondary.gamma_multiply(0.5) };
                let fill = if active { theme.accent.gamma_multiply(0.15) } else { Color32::TRANSPARENT };
                ui.painter().rect_filled(zone, Rounding::same(12.0), fill);
                ui.painter().rect_stroke(zone, Rounding::same(12.0), Stroke::new(2.0, stroke_color));

                let mut zone_ui = ui.new_child(
                    egui::UiBuilder::new()
                        .max_rect(zone.shrink(16.0))
                        .layout(egui::Layout::top_down(egui::Align::Center)),
                );
                zone_ui.add_space(8.0);
                zone_ui.label(RichText::new("⬆").size(28.0).color(theme.accent));
                zone_ui.label(RichText::new("Drag and drop images here, or").color(theme.text));
                zone_ui.add_space(6.0);
                if zone_ui.add_enabled(!uploading, egui::Button::new("Browse Files")).clicked() {
                    if let Some(paths) = pick_images() {
                        action = Some(UploadAction::FilesChosen(paths));
                    }
                }

                // Previews
                if !session.entries().is_empty() {
                    ui.add_space(12.0);
                    ui.label(RichText::new(format!("Selected ({})", session.entries().len())).color(theme.text_secondary));
                    egui::ScrollArea::vertical()
                        .id_salt("upload_previews")
                        .max_height(2.0 * (PREVIEW_EDGE + 28.0))
                        .show(ui, |ui| {
                            ui.horizontal_wrapped(|ui| {
                                for entry in session.entries() {
                                    ui.vertical(|ui| {
                                        ui.set_width(PREVIEW_EDGE);
                                        let (rect, _) = ui.allocate_exact_size(Vec2::splat(PREVIEW_EDGE), Sense::hover());
                                        match (&entry.preview, self.previews.get(&entry.id)) {
                                            (_, Some(texture)) => {
                                                egui::Image::from_texture(texture)
                                                    .rounding(Rounding::same(8.0))
                                                    .paint_at(ui, rect);
                                            }
                                            (PreviewState::Failed(reason), None) => {
                                                ui.painter().rect_filled(rect, Rounding::same(8.0), theme.primary);
                                                ui.painter().text(rect.center(), Align2::CENTER_CENTER, "⚠", egui::FontId::proportional(24.0), theme.error);
                                                ui.interact(rect, ui.id().with(("failed", entry.id)), Sense::hover())
                                                    .on_hover_text(reason);
                                            }
                                            _ => {
                                                ui.painter().rect_filled(rect, Rounding::same(8.0), theme.primary);
                                                ui.put(rect, egui::Spinner::new());
                                            }
                                        }

                                        let remove = egui::Rect::from_min_size(rect.right_top() + Vec2::new(-26.0, 4.0), Vec2::splat(22.0));
                                        if !uploading
                                            && ui.put(remove, egui::Button::new("✖").rounding(11.0)).clicked()
                                        {
                                            action = Some(UploadAction::Remove(entry.id));
                                        }

                                        ui.add(egui::Label::new(RichText::new(&entry.file.name).size(11.0)).wrap_mode(egui::TextWrapMode::Truncate));
                                        ui.label(RichText::new(format_size(entry.file.len())).size(10.0).color(theme.text_secondary));
                                    });
                                }
                            });
                        });
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    ui.label("Category");
                    let mut selected = session.category().to_string();
                    ui.add_enabled_ui(!uploading, |ui| {
                        ComboBox::from_id_salt("upload_category")
                            .selected_text(&selected)
                            .show_ui(ui, |ui| {
                                for category in categories {
                                    ui.selectable_value(&mut selected, category.clone(), category);
                                }
                            });
                    });
                    if selected != session.category() {
                        action = Some(UploadAction::CategoryChanged(selected));
                    }
                });

                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let submit = egui::Button::new(RichText::new(session.submit_label()).color(Color32::WHITE))
                            .fill(theme.accent);
                        if ui.add_enabled(session.can_submit(), submit).clicked() {
                            action = Some(UploadAction::Submit);
                        }
                        if uploading {
                            ui.spinner();
                        }
                        if ui.add_enabled(!uploading, egui::Button::new("Cancel")).clicked() {
                            action = Some(UploadAction::Close);
                        }
                    });
                });
            });

        action
    }
}

/// Native multi-file picker filtered to image types
fn pick_images() -> Option<Vec<PathBuf>> {
    let picked = rfd::FileDialog::new()
        .set_title("Select images")
        .add_filter("Images", app_fs::SUPPORTED_EXTENSIONS)
        .pick_files();
    tracing::debug!("File picker returned {:?}", picked.as_ref().map(Vec::len));
    picked
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R'];

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 / 2), "1.5 MB");
    }

    #[test]
    fn test_previews_follow_entries() {
        let ctx = egui::Context::default();
        let mut dialog = UploadDialog::new();
        let mut session = UploadSession::new("Nature");
        let jobs = session.add_files(vec![
            ("a.png".to_string(), Arc::from(PNG)),
            ("b.png".to_string(), Arc::from(PNG)),
        ]);
        for job in &jobs {
            session.preview_resolved(
                job.entry,
                Ok(app_core::PreviewImage {
                    width: 1,
                    height: 1,
                    rgba: Arc::from(vec![0u8; 4]),
                }),
            );
        }

        dialog.sync_previews(&ctx, &session);
        assert_eq!(dialog.previews.len(), 2);

        session.remove_entry(jobs[0].entry);
        dialog.sync_previews(&ctx, &session);
        assert_eq!(dialog.previews.len(), 1);
        assert!(dialog.previews.contains_key(&jobs[1].entry));
    }
}
