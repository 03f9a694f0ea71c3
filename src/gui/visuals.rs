//! Maps a derived theme onto egui's visuals

use eframe::egui;

use crate::config::ColorMode;
use crate::theme::{Rgba, ThemeDescriptor};

pub fn color(rgba: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
}

pub fn visuals(theme: &ThemeDescriptor) -> egui::Visuals {
    let mut visuals = match theme.mode {
        ColorMode::Light => egui::Visuals::light(),
        ColorMode::Dark => egui::Visuals::dark(),
    };

    let palette = &theme.palette;
    visuals.panel_fill = color(palette.background);
    visuals.window_fill = color(palette.surface);
    visuals.extreme_bg_color = color(palette.surface);
    visuals.faint_bg_color = color(palette.background);
    visuals.override_text_color = Some(color(palette.text));
    visuals.hyperlink_color = color(palette.primary);
    visuals.selection.bg_fill = color(palette.primary);
    visuals.selection.stroke = egui::Stroke::new(1.0, color(palette.on_primary));

    let stroke_width = if theme.shape.bordered { 1.0 } else { 0.5 };
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(stroke_width, color(palette.divider));

    let radius = egui::CornerRadius::same(theme.shape.corner_radius);
    visuals.window_corner_radius = radius;
    visuals.menu_corner_radius = radius;

    if !theme.shape.elevated {
        visuals.window_shadow = egui::Shadow::NONE;
        visuals.popup_shadow = egui::Shadow::NONE;
    }

    visuals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Skin};
    use crate::theme::{self, ThemeInput};

    fn theme_for(config: &Configuration) -> ThemeDescriptor {
        theme::derive(ThemeInput::from(config))
    }

    #[test]
    fn test_dark_theme_produces_dark_visuals() {
        let theme = theme_for(&Configuration { color_mode: ColorMode::Dark, ..Configuration::default() });
        let visuals = visuals(&theme);
        assert!(visuals.dark_mode);
        assert_eq!(visuals.panel_fill, color(theme.palette.background));
        assert_eq!(visuals.override_text_color, Some(color(theme.palette.text)));
    }

    #[test]
    fn test_bordered_skin_drops_shadows() {
        let theme = theme_for(&Configuration { skin: Skin::Bordered, ..Configuration::default() });
        let visuals = visuals(&theme);
        assert_eq!(visuals.window_shadow, egui::Shadow::NONE);
        assert_eq!(visuals.widgets.noninteractive.bg_stroke.width, 1.0);
    }
}
