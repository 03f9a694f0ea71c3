//! Side navigation renderer

use eframe::egui;

use crate::gui::visuals::color;
use crate::navigation::{NavEntry, Presentation};
use crate::theme::NavPalette;

/// Human label for a translation key: `nav.invoiceList` becomes `Invoice list`
pub fn display_label(label_key: &str) -> String {
    let last = label_key.rsplit('.').next().unwrap_or(label_key);
    let mut label = String::with_capacity(last.len() + 4);
    for (i, ch) in last.chars().enumerate() {
        if ch == '-' || ch == '_' {
            label.push(' ');
        } else if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.extend(ch.to_lowercase());
        } else {
            label.push(ch);
        }
    }
    label
}

/// Two-letter badge shown in the collapsed rail
fn initials(label_key: &str) -> String {
    display_label(label_key).chars().take(2).collect()
}

pub struct NavMenu<'a> {
    pub palette: &'a NavPalette,
    /// Narrow rail: show initials only
    pub collapsed: bool,
    pub active_path: &'a mut Option<String>,
}

impl NavMenu<'_> {
    /// Renders `entries`; returns true when a link was followed
    pub fn ui(&mut self, ui: &mut egui::Ui, entries: &[NavEntry]) -> bool {
        let mut followed = false;
        for entry in entries {
            followed |= self.entry(ui, entry);
        }
        followed
    }

    fn label(&self, entry: &NavEntry) -> String {
        if self.collapsed {
            initials(&entry.label_key)
        } else {
            display_label(&entry.label_key)
        }
    }

    fn entry(&mut self, ui: &mut egui::Ui, entry: &NavEntry) -> bool {
        match entry.presentation {
            Presentation::Link => self.link(ui, entry),
            Presentation::Group { expanded } if !self.collapsed => {
                let mut followed = false;
                egui::CollapsingHeader::new(egui::RichText::new(self.label(entry)).color(color(self.palette.text)))
                    .id_salt(&entry.id)
                    .default_open(expanded)
                    .show(ui, |ui| {
                        followed = self.ui(ui, &entry.children);
                    });
                followed
            }
            // Groups in the collapsed rail open as flyouts too
            Presentation::Group { .. } | Presentation::Flyout => {
                let mut followed = false;
                ui.menu_button(self.label(entry), |ui| {
                    let mut flyout = NavMenu {
                        palette: self.palette,
                        collapsed: false,
                        active_path: &mut *self.active_path,
                    };
                    followed = flyout.ui(ui, &entry.children);
                });
                followed
            }
        }
    }

    fn link(&mut self, ui: &mut egui::Ui, entry: &NavEntry) -> bool {
        let selected = entry.path.is_some() && *self.active_path == entry.path;
        let (text, fill) = if selected {
            (self.palette.active_text, Some(self.palette.active_background))
        } else {
            (self.palette.text, None)
        };

        let mut label = egui::RichText::new(self.label(entry)).color(color(text));
        if fill.is_some() {
            label = label.strong();
        }

        let response = egui::Frame::NONE
            .fill(fill.map(color).unwrap_or(egui::Color32::TRANSPARENT))
            .corner_radius(egui::CornerRadius::same(4))
            .show(ui, |ui| ui.selectable_label(selected, label))
            .inner;

        let response = match &entry.path {
            Some(path) => response.on_hover_text(path.as_str()),
            None => response,
        };

        if response.clicked() {
            *self.active_path = entry.path.clone();
            return true;
        }
        false
    }
}
