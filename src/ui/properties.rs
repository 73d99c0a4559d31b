// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Labels and boxes side panel.
//!
//! Lists the registered labels with controls to add and remove them, and
//! the boxes of the current image with their geometry.

use crate::models::{BoundingBox, LabelRegistry};
use crate::ui::painter::box_color;

/// Result of side panel interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    AddLabel(String),
    RemoveLabel(String),
    SelectBox(usize),
    DeleteBox(usize),
}

/// List entry for one box, e.g. `1. car [10, 20, 30x40]`.
pub fn box_summary(index: usize, bbox: &BoundingBox) -> String {
    let label = if bbox.label.is_empty() {
        "(unlabeled)"
    } else {
        bbox.label.as_str()
    };
    format!("{}. {} {}", index + 1, label, bbox.rect)
}

/// Display the side panel.
pub fn show(
    ui: &mut egui::Ui,
    labels: &LabelRegistry,
    new_label: &mut String,
    boxes: &[BoundingBox],
    selected: Option<usize>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.heading("Labels");
    ui.label(egui::RichText::new("Create labels for objects you want to detect").weak());

    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(new_label);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Add").clicked() || submitted {
            action = PropertiesAction::AddLabel(new_label.trim().to_string());
        }
    });

    egui::ScrollArea::vertical()
        .id_source("labels_list")
        .max_height(150.0)
        .show(ui, |ui| {
            for (id, name) in labels.labels() {
                ui.horizontal(|ui| {
                    ui.label(format!("{}: {}", id, name));
                    if ui.small_button("✖").on_hover_text("Remove label").clicked() {
                        action = PropertiesAction::RemoveLabel(name.to_string());
                    }
                });
            }
        });

    ui.separator();
    ui.heading("Boxes");

    if boxes.is_empty() {
        ui.label(egui::RichText::new("Drag on the image to draw a box").weak());
    }

    egui::ScrollArea::vertical()
        .id_source("boxes_list")
        .show(ui, |ui| {
            for (index, bbox) in boxes.iter().enumerate() {
                let text = egui::RichText::new(box_summary(index, bbox)).color(box_color(index));
                if ui.selectable_label(selected == Some(index), text).clicked() {
                    action = PropertiesAction::SelectBox(index);
                }
            }
        });

    ui.separator();

    if ui
        .add_enabled(selected.is_some(), egui::Button::new("Delete Selected Box"))
        .clicked()
    {
        if let Some(index) = selected {
            action = PropertiesAction::DeleteBox(index);
        }
    }

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassId, Rect};

    #[test]
    fn test_box_summary() {
        let bbox = BoundingBox::new(Rect::new(10, 20, 30, 40), "car", Some(ClassId(0)));
        assert_eq!(box_summary(0, &bbox), "1. car [10, 20, 30x40]");

        let unlabeled = BoundingBox::new(Rect::new(0, 0, 5, 5), "", Some(ClassId(9)));
        assert_eq!(box_summary(3, &unlabeled), "4. (unlabeled) [0, 0, 5x5]");
    }
}
