//! Status line component

use crate::Theme;
use egui::{RichText, Ui};
use std::time::{Duration, Instant};

/// How long a message stays visible
const MESSAGE_TTL: Duration = Duration::from_secs(6);

/// Status line contents
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    /// e.g. `"3 of 8 shown"`
    pub count: String,

    /// View mode label
    pub view_mode: String,

    message: Option<(String, bool, Instant)>,
}

impl StatusInfo {
    pub fn info(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), false, Instant::now()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), true, Instant::now()));
    }

    /// Current message and whether it is an error
    pub fn message(&self) -> Option<(&str, bool)> {
        self.message
            .as_ref()
            .filter(|(_, _, at)| at.elapsed() < MESSAGE_TTL)
            .map(|(text, is_error, _)| (text.as_str(), *is_error))
    }
}

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn ui(ui: &mut Ui, info: &StatusInfo, theme: &Theme) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&info.count).color(theme.text_secondary));
            ui.separator();
            ui.label(RichText::new(&info.view_mode).color(theme.text_secondary));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some((text, is_error)) = info.message() {
                    let color = if is_error { theme.error } else { theme.success };
                    ui.label(RichText::new(text).color(color));
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_message_wins() {
        let mut info = StatusInfo::default();
        assert!(info.message().is_none());

        info.info("Saved");
        info.error("Download failed");
        assert_eq!(info.message(), Some(("Download failed", true)));
    }
}
