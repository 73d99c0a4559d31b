// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label request for a freshly drawn box.

use crate::models::{LabelRegistry, Rect};

/// Outcome of the prompt this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    None,
    Confirm { rect: Rect, label: String },
    Cancel,
}

/// Modal window asking which label a new box gets.
#[derive(Debug, Default)]
pub struct LabelPrompt {
    pending: Option<Rect>,
    choice: String,
}

impl LabelPrompt {
    /// Start asking for a label for `rect`, preselecting `default_label`.
    pub fn open(&mut self, rect: Rect, default_label: &str) {
        self.pending = Some(rect);
        if self.choice.is_empty() {
            self.choice = default_label.to_string();
        }
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Display the prompt if a box is waiting for a label.
    pub fn show(&mut self, ctx: &egui::Context, labels: &LabelRegistry) -> PromptAction {
        let Some(rect) = self.pending else {
            return PromptAction::None;
        };
        if !labels.contains(&self.choice) {
            self.choice = labels
                .labels()
                .next()
                .map(|(_, name)| name.to_string())
                .unwrap_or_default();
        }

        let mut action = PromptAction::None;
        egui::Window::new("Select Label")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("Choose a label for this bounding box:");
                egui::ComboBox::from_id_source("label_choice")
                    .selected_text(self.choice.as_str())
                    .show_ui(ui, |ui| {
                        for (_, name) in labels.labels() {
                            ui.selectable_value(&mut self.choice, name.to_string(), name);
                        }
                    });

                ui.horizontal(|ui| {
                    let confirmed = ui.button("OK").clicked()
                        || ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if confirmed && !self.choice.is_empty() {
                        action = PromptAction::Confirm {
                            rect,
                            label: self.choice.clone(),
                        };
                    }
                    if ui.button("Cancel").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                        action = PromptAction::Cancel;
                    }
                });
            });

        if action != PromptAction::None {
            self.pending = None;
        }
        action
    }
}
