//! Settings customizer panel

use std::fmt::Display;

use eframe::egui;

use crate::config::{
    ColorMode, ConfigPatch, Configuration, ContentWidth, Contrast, Direction, Locale, NavColor,
    NavigationMenuType, SideNavState, Skin,
};
use crate::gui::constants::{ITEM_SPACING, SECTION_SPACING};

pub enum CustomizerAction {
    None,
    Update(ConfigPatch),
    Reset,
}

/// Combo box over a closed setting; returns the new value when the user picked one
fn choice<T>(ui: &mut egui::Ui, id: &str, label: &str, current: T, options: &[T]) -> Option<T>
where
    T: Copy + PartialEq + Display,
{
    let mut selected = current;
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add_space(5.0);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.to_string())
            .show_ui(ui, |ui| {
                for &option in options {
                    ui.selectable_value(&mut selected, option, option.to_string());
                }
            });
    });
    ui.add_space(ITEM_SPACING);
    (selected != current).then_some(selected)
}

/// Renders the customizer and returns what the user asked for this frame.
/// `docked` is whether the window is wide enough for a docked side menu.
pub fn ui(ui: &mut egui::Ui, config: &Configuration, docked: bool) -> CustomizerAction {
    let mut patch = ConfigPatch::new();

    ui.group(|ui| {
        ui.label(egui::RichText::new("Theming").heading().strong());
        ui.add_space(ITEM_SPACING);

        if let Some(mode) = choice(ui, "color_mode", "Mode:", config.color_mode, ColorMode::ALL) {
            patch = std::mem::take(&mut patch).color_mode(mode);
        }
        if let Some(contrast) = choice(ui, "contrast", "Contrast:", config.contrast, Contrast::ALL) {
            patch = std::mem::take(&mut patch).contrast(contrast);
        }
        if let Some(skin) = choice(ui, "skin", "Skin:", config.skin, Skin::ALL) {
            patch = std::mem::take(&mut patch).skin(skin);
        }
        if let Some(nav_color) = choice(ui, "nav_color", "Menu color:", config.nav_color, NavColor::ALL) {
            patch = std::mem::take(&mut patch).nav_color(nav_color);
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Layout").heading().strong());
        ui.add_space(ITEM_SPACING);

        if let Some(menu_type) = choice(
            ui,
            "navigation_menu_type",
            "Menu type:",
            config.navigation_menu_type,
            NavigationMenuType::ALL,
        ) {
            patch = std::mem::take(&mut patch).navigation_menu_type(menu_type);
        }
        if let Some(state) = choice(ui, "side_nav_state", "Menu state:", config.side_nav_state, SideNavState::ALL) {
            patch = std::mem::take(&mut patch).side_nav_state(state);
        }
        if let Some(width) = choice(ui, "content_width", "Content:", config.content_width, ContentWidth::ALL) {
            patch = std::mem::take(&mut patch).content_width(width);
        }
        if let Some(direction) = choice(ui, "direction", "Direction:", config.direction, Direction::ALL) {
            patch = std::mem::take(&mut patch).direction(direction);
        }

        if !docked {
            ui.label(
                egui::RichText::new("(Menu type and state apply once the window is wide enough)")
                    .small()
                    .italics(),
            );
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Language").heading().strong());
        ui.add_space(ITEM_SPACING);

        // Picking a locale also flips the direction to the one it is written in
        if let Some(locale) = choice(ui, "locale", "Locale:", config.locale, Locale::ALL) {
            patch = std::mem::take(&mut patch)
                .locale(locale)
                .direction(locale.natural_direction());
        }
    });

    ui.add_space(SECTION_SPACING);

    let reset = ui.button("\u{21BA} Reset to defaults").clicked();

    if reset {
        CustomizerAction::Reset
    } else if patch.is_empty() {
        CustomizerAction::None
    } else {
        CustomizerAction::Update(patch)
    }
}
