//! Stand-in for the auth collaborator: toggles the capabilities the preview user holds

use std::collections::BTreeSet;

use eframe::egui;

use crate::gui::constants::ITEM_SPACING;
use crate::navigation::{Capability, Identity};

/// Renders one checkbox per capability; returns the new identity when one was toggled
pub fn ui(ui: &mut egui::Ui, available: &BTreeSet<Capability>, identity: &Identity) -> Option<Identity> {
    let mut held = identity.capabilities.clone();
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Signed-in User").heading().strong());
        ui.add_space(ITEM_SPACING);

        if available.is_empty() {
            ui.label(egui::RichText::new("(Navigation tree has no restricted entries)").italics().weak());
            return;
        }

        for capability in available {
            let mut on = held.contains(capability);
            if ui.checkbox(&mut on, capability.as_str()).changed() {
                changed = true;
                if on {
                    held.insert(capability.clone());
                } else {
                    held.remove(capability);
                }
            }
        }
    });

    changed.then(|| Identity { capabilities: held })
}
