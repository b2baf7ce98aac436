//! Gallery grid and masonry layouts

use super::image_card::{CardAction, CardFit, ImageCard};
use crate::textures::TextureCache;
use crate::Theme;
use app_core::{ImageId, ImageRecord, ViewMode};
use egui::{Pos2, Rect, Sense, Ui, Vec2};

/// Action returned from the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    Open(ImageId),
    Download(ImageId),
}

/// Window-width breakpoints, widest first
const BREAKPOINTS: [(f32, usize); 3] = [(1280.0, 4), (1024.0, 3), (640.0, 2)];

pub const SPACING: f32 = 24.0;

/// Aspect ratio assumed for images that are still loading
const PLACEHOLDER_ASPECT: f32 = 0.75;

/// Column count for a window of `width` points
pub fn columns_for_width(width: f32) -> usize {
    BREAKPOINTS
        .iter()
        .find(|(min, _)| width >= *min)
        .map(|(_, columns)| *columns)
        .unwrap_or(1)
}

fn column_width(width: f32, columns: usize, spacing: f32) -> f32 {
    let columns = columns.max(1) as f32;
    ((width - spacing * (columns - 1.0)) / columns).max(0.0)
}

/// Square cells, row by row. Returns cell rects relative to the origin and the total height.
pub fn grid_layout(count: usize, columns: usize, width: f32, spacing: f32) -> (Vec<Rect>, f32) {
    let columns = columns.max(1);
    let side = column_width(width, columns, spacing);

    let rects: Vec<Rect> = (0..count)
        .map(|i| {
            let (row, col) = (i / columns, i % columns);
            Rect::from_min_size(
                Pos2::new(col as f32 * (side + spacing), row as f32 * (side + spacing)),
                Vec2::splat(side),
            )
        })
        .collect();

    let rows = count.div_ceil(columns);
    let height = if rows == 0 {
        0.0
    } else {
        rows as f32 * side + (rows - 1) as f32 * spacing
    };
    (rects, height)
}

/// Each card goes to the currently shortest column. `aspects` are height over width.
pub fn masonry_layout(aspects: &[f32], columns: usize, width: f32, spacing: f32) -> (Vec<Rect>, f32) {
    let columns = columns.max(1);
    let col_width = column_width(width, columns, spacing);
    let mut heights = vec![0.0f32; columns];

    let rects = aspects
        .iter()
        .map(|aspect| {
            let (col, top) = heights
                .iter()
                .copied()
                .enumerate()
                .fold((0, f32::INFINITY), |best, (i, h)| if h < best.1 { (i, h) } else { best });

            let card_height = col_width * aspect.max(0.05);
            heights[col] = top + card_height + spacing;
            Rect::from_min_size(
                Pos2::new(col as f32 * (col_width + spacing), top),
                Vec2::new(col_width, card_height),
            )
        })
        .collect();

    let height = heights.iter().copied().fold(0.0f32, f32::max);
    (rects, (height - spacing).max(0.0))
}

pub struct GalleryGrid;

impl GalleryGrid {
    /// Render `images`; scrolling is disabled while `scroll_enabled` is false
    pub fn ui(
        ui: &mut Ui,
        images: &[&ImageRecord],
        textures: &TextureCache,
        mode: ViewMode,
        scroll_enabled: bool,
        theme: &Theme,
    ) -> Option<GridAction> {
        if images.is_empty() {
            ui.add_space(48.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("No images found in this category")
                        .size(18.0)
                        .color(theme.text_secondary),
                );
            });
            return None;
        }

        let columns = columns_for_width(ui.ctx().screen_rect().width());
        let mut action = None;

        egui::ScrollArea::vertical()
            .id_salt("gallery_scroll")
            .auto_shrink([false, false])
            .enable_scrolling(scroll_enabled)
            .show(ui, |ui| {
                let width = ui.available_width();

                let (rects, height) = match mode {
                    ViewMode::Grid => grid_layout(images.len(), columns, width, SPACING),
                    ViewMode::Masonry => {
                        let aspects: Vec<f32> = images
                            .iter()
                            .map(|r| textures.aspect(&r.id).unwrap_or(PLACEHOLDER_ASPECT))
                            .collect();
                        masonry_layout(&aspects, columns, width, SPACING)
                    }
                };

                let (area, _) = ui.allocate_exact_size(Vec2::new(width, height), Sense::hover());
                let fit = match mode {
                    ViewMode::Grid => CardFit::Cover,
                    ViewMode::Masonry => CardFit::Stretch,
                };

                for (record, rect) in images.iter().zip(rects) {
                    let rect = rect.translate(area.min.to_vec2());
                    let texture = textures.texture(&record.id);
                    let failed = textures.is_failed(&record.id);
                    match ImageCard::ui(ui, rect, record, texture, failed, fit, theme) {
                        Some(CardAction::View) => action = Some(GridAction::Open(record.id.clone())),
                        Some(CardAction::Download) => action = Some(GridAction::Download(record.id.clone())),
                        None => {}
                    }
                }
            });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(columns_for_width(320.0), 1);
        assert_eq!(columns_for_width(639.9), 1);
        assert_eq!(columns_for_width(640.0), 2);
        assert_eq!(columns_for_width(1023.0), 2);
        assert_eq!(columns_for_width(1024.0), 3);
        assert_eq!(columns_for_width(1280.0), 4);
        assert_eq!(columns_for_width(3000.0), 4);
    }

    #[test]
    fn test_grid_layout() {
        let (rects, height) = grid_layout(5, 2, 220.0, 20.0);
        assert_eq!(rects.len(), 5);
        assert_eq!(rects[0].size(), Vec2::splat(100.0));
        assert_eq!(rects[1].min, Pos2::new(120.0, 0.0));
        assert_eq!(rects[2].min, Pos2::new(0.0, 120.0));
        assert_eq!(height, 3.0 * 100.0 + 2.0 * 20.0);
    }

    #[test]
    fn test_grid_layout_empty() {
        let (rects, height) = grid_layout(0, 3, 500.0, 10.0);
        assert!(rects.is_empty());
        assert_eq!(height, 0.0);
    }

    #[test]
    fn test_masonry_shortest_column() {
        // Two columns of width 100: tall card left, then two short ones fill the right
        let (rects, height) = masonry_layout(&[2.0, 0.5, 0.5, 1.0], 2, 200.0, 0.0);
        assert_eq!(rects[0].min.x, 0.0);
        assert_eq!(rects[1].min.x, 100.0);
        assert_eq!(rects[2].min, Pos2::new(100.0, 50.0));
        // Right column is now 100 tall, left 200: fourth card goes right
        assert_eq!(rects[3].min, Pos2::new(100.0, 100.0));
        assert_eq!(height, 200.0);
    }

    #[test]
    fn test_masonry_keeps_aspect() {
        let (rects, _) = masonry_layout(&[0.75], 3, 340.0, 20.0);
        assert_eq!(rects[0].width(), 100.0);
        assert_eq!(rects[0].height(), 75.0);
    }
}
