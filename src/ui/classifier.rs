// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Category side panel for classification mode.

use crate::io::CategoryStore;

/// Result of category panel interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierAction {
    None,
    AddCategory(String),
    Classify(String),
}

/// Display the category panel.
///
/// `chosen` holds the category picked in the combo box, empty for none.
pub fn show(
    ui: &mut egui::Ui,
    categories: &CategoryStore,
    new_category: &mut String,
    chosen: &mut String,
    has_image: bool,
) -> ClassifierAction {
    let mut action = ClassifierAction::None;

    ui.heading("Categories");
    ui.label(egui::RichText::new("Each category becomes a folder in the output directory").weak());

    ui.horizontal(|ui| {
        let response = ui.text_edit_singleline(new_category);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Add").clicked() || submitted {
            action = ClassifierAction::AddCategory(new_category.trim().to_string());
        }
    });

    ui.separator();

    if !categories.contains(chosen) {
        chosen.clear();
    }
    let selected_text = if chosen.is_empty() {
        "-- Select Category --"
    } else {
        chosen.as_str()
    };
    egui::ComboBox::from_id_source("category_choice")
        .selected_text(selected_text.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for name in categories.categories() {
                ui.selectable_value(&mut *chosen, name.to_string(), name);
            }
        });

    ui.add_space(8.0);

    let can_classify = has_image && !chosen.is_empty();
    if ui
        .add_enabled(can_classify, egui::Button::new("Classify and Move Image"))
        .clicked()
    {
        action = ClassifierAction::Classify(chosen.clone());
    }

    ui.add_space(8.0);
    ui.label(
        egui::RichText::new(format!("Output: {}", categories.output_dir().display())).weak(),
    );

    action
}
