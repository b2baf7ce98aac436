//! Application theming

use egui::{Color32, Style, Visuals};

/// Application theme
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub dark: bool,
    pub background: Color32,
    pub surface: Color32,
    pub primary: Color32,
    pub text: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    /// Second accent, used with `accent` for header and pill gradients
    pub accent_alt: Color32,
    pub overlay: Color32,
    pub particle: Color32,
    pub error: Color32,
    pub success: Color32,
}

impl Theme {
    /// Purple/pink night theme (default)
    pub fn dusk() -> Self {
        Self {
            name: "dusk".to_string(),
            dark: true,
            background: Color32::from_rgb(15, 12, 41),
            surface: Color32::from_rgb(36, 28, 74),
            primary: Color32::from_rgb(55, 44, 104),
            text: Color32::from_rgb(245, 243, 255),
            text_secondary: Color32::from_rgb(196, 181, 253),
            accent: Color32::from_rgb(168, 85, 247),  // Purple
            accent_alt: Color32::from_rgb(236, 72, 153), // Pink
            overlay: Color32::from_rgba_unmultiplied(0, 0, 0, 230),
            particle: Color32::WHITE,
            error: Color32::from_rgb(248, 113, 113),
            success: Color32::from_rgb(74, 222, 128),
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            dark: false,
            background: Color32::from_rgb(250, 245, 255),
            surface: Color32::from_rgb(255, 255, 255),
            primary: Color32::from_rgb(237, 233, 254),
            text: Color32::from_rgb(30, 27, 75),
            text_secondary: Color32::from_rgb(91, 84, 140),
            accent: Color32::from_rgb(147, 51, 234),
            accent_alt: Color32::from_rgb(219, 39, 119),
            overlay: Color32::from_rgba_unmultiplied(0, 0, 0, 210),
            particle: Color32::from_rgb(147, 51, 234),
            error: Color32::from_rgb(220, 38, 38),
            success: Color32::from_rgb(34, 197, 94),
        }
    }

    /// Apply theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style: Style = (*ctx.style()).clone();
        let mut visuals = if self.dark {
            Visuals::dark()
        } else {
            Visuals::light()
        };

        // Customize visuals
        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = self.primary;
        visuals.window_rounding = egui::Rounding::same(16.0);

        visuals.widgets.noninteractive.bg_fill = self.surface;
        visuals.widgets.noninteractive.fg_stroke.color = self.text;

        visuals.widgets.inactive.bg_fill = self.primary;
        visuals.widgets.inactive.weak_bg_fill = self.primary;
        visuals.widgets.inactive.fg_stroke.color = self.text;

        visuals.widgets.hovered.bg_fill = self.accent.linear_multiply(0.4);
        visuals.widgets.hovered.weak_bg_fill = self.accent.linear_multiply(0.4);
        visuals.widgets.hovered.fg_stroke.color = self.text;

        visuals.widgets.active.bg_fill = self.accent.linear_multiply(0.6);
        visuals.widgets.active.fg_stroke.color = self.text;

        visuals.selection.bg_fill = self.accent.linear_multiply(0.5);
        visuals.selection.stroke.color = self.accent_alt;

        style.visuals = visuals;
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        ctx.set_style(style);
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dusk(),
        }
    }

    /// Blend between the two accents; `t` in [0, 1]
    pub fn accent_mix(&self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(
            lerp(self.accent.r(), self.accent_alt.r()),
            lerp(self.accent.g(), self.accent_alt.g()),
            lerp(self.accent.b(), self.accent_alt.b()),
        )
    }

    /// Parse a hex color string
    pub fn parse_color(hex: &str) -> Option<Color32> {
        let hex = hex.trim_start_matches('#');

        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        } else if hex.len() == 8 {
            let a = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let r = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let g = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let b = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color32::from_rgba_unmultiplied(r, g, b, a))
        } else {
            None
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dusk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(Theme::parse_color("#a855f7"), Some(Color32::from_rgb(168, 85, 247)));
        assert_eq!(
            Theme::parse_color("80ec4899"),
            Some(Color32::from_rgba_unmultiplied(236, 72, 153, 128))
        );
        assert_eq!(Theme::parse_color("#12345"), None);
        assert_eq!(Theme::parse_color("zzzzzz"), None);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("LIGHT").name, "light");
        assert_eq!(Theme::by_name("anything").name, "dusk");
    }

    #[test]
    fn test_accent_mix_ends() {
        let theme = Theme::dusk();
        assert_eq!(theme.accent_mix(0.0), theme.accent);
        assert_eq!(theme.accent_mix(1.0), theme.accent_alt);
        assert_eq!(theme.accent_mix(7.0), theme.accent_alt);
    }
}
