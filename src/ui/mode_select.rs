// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Startup screen for picking the session mode.

use crate::config::Mode;

fn description(mode: Mode) -> &'static str {
    match mode {
        Mode::Classification => {
            "Assign a single category to each entire image.\n\
             Use this for image classification datasets."
        }
        Mode::Detection => {
            "Draw bounding boxes around objects and label them.\n\
             Use this for object detection datasets (YOLO format)."
        }
    }
}

/// Display the mode choice. Returns the mode once the user confirms.
pub fn show(ui: &mut egui::Ui, choice: &mut Mode) -> Option<Mode> {
    let mut confirmed = None;

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.2);
        ui.heading("Machine Learning Dataset Preparation Tool");
        ui.add_space(8.0);
        ui.label("Please select the mode you want to use:");
        ui.add_space(16.0);

        for mode in [Mode::Classification, Mode::Detection] {
            ui.radio_value(&mut *choice, mode, mode.title());
            ui.label(egui::RichText::new(description(mode)).weak());
            ui.add_space(8.0);
        }

        ui.add_space(8.0);
        if ui.button("Continue").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            confirmed = Some(*choice);
        }
    });

    confirmed
}
