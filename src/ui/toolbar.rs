// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Navigation toolbar.
//!
//! Previous / next / skip buttons, save actions and the session progress
//! line shown above the canvas.

use crate::config::Mode;

/// Button pressed in the toolbar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Previous,
    Next,
    Skip,
    Save,
    SaveAndNext,
}

/// What the toolbar needs to know about the session.
pub struct Progress {
    /// Zero-based index of the image on display.
    pub current: Option<usize>,
    pub total: usize,
    /// Images saved (detection) or classified (classification) so far.
    pub done: usize,
    pub mode: Mode,
}

impl Progress {
    pub fn summary(&self) -> String {
        match self.current {
            Some(index) if self.total > 0 => format!(
                "Image {} of {} | {}: {}",
                index + 1,
                self.total,
                self.done_label(),
                self.done
            ),
            _ => "No images loaded".to_string(),
        }
    }

    fn done_label(&self) -> &'static str {
        match self.mode {
            Mode::Detection => "Annotated",
            Mode::Classification => "Processed",
        }
    }

    /// Share of images done, for the progress bar.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f32 / self.total as f32
        }
    }
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, progress: &Progress) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let has_image = progress.current.is_some();
    let has_previous = progress.current.is_some_and(|i| i > 0);
    let has_next = progress.current.is_some_and(|i| i + 1 < progress.total);

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(has_previous, egui::Button::new("◀ Previous")).clicked() {
            action = ToolbarAction::Previous;
        }
        if ui.add_enabled(has_next, egui::Button::new("Next ▶")).clicked() {
            action = ToolbarAction::Next;
        }
        if ui.add_enabled(has_image, egui::Button::new("Skip")).clicked() {
            action = ToolbarAction::Skip;
        }

        ui.separator();

        if progress.mode == Mode::Detection {
            if ui.add_enabled(has_image, egui::Button::new("Save (Ctrl+S)")).clicked() {
                action = ToolbarAction::Save;
            }
            if ui.add_enabled(has_image, egui::Button::new("Save & Next")).clicked() {
                action = ToolbarAction::SaveAndNext;
            }

            ui.separator();
        }

        ui.label(egui::RichText::new(progress.summary()).weak());
        ui.add(
            egui::ProgressBar::new(progress.fraction())
                .desired_width(160.0)
                .show_percentage(),
        );
    });

    action
}
