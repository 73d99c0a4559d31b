// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module owns the session: the image list, the dataset stores, and the
//! canvas engine. In detection mode it translates egui input into canvas
//! input and reacts to the events the canvas reports. In classification mode
//! it files whole images into category folders.

use crate::config::{Config, Mode};
use crate::io::{media, AnnotationStore, CategoryStore};
use crate::models::{BoundingBox, LabelRegistry};
use crate::ui::classifier::{self, ClassifierAction};
use crate::ui::label_prompt::{LabelPrompt, PromptAction};
use crate::ui::pointer::{PointerFrame, PointerTracker};
use crate::ui::properties::{self, PropertiesAction};
use crate::ui::toolbar::{self, Progress, ToolbarAction};
use crate::ui::{mode_select, painter, CanvasEvent, CanvasInput, ImageCanvas, InteractionState};
use crate::util::geometry::Point;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Main application state.
pub struct BoxlabApp {
    /// Session mode, `None` until the user picks one
    mode: Option<Mode>,

    /// Highlighted entry of the mode selection screen
    mode_choice: Mode,

    /// Labels registered on top of every class list
    seed_labels: Vec<String>,

    /// Annotation files, class list and the session's label registry
    store: AnnotationStore,

    /// Category folders for classification mode
    categories: CategoryStore,

    /// Boxes of the current image and the pointer state machine
    canvas: ImageCanvas,

    /// Pointer position memory across frames
    pointer: PointerTracker,

    /// Images opened in this session
    images: Vec<PathBuf>,

    /// Index into `images` of the image on display
    current: Option<usize>,

    /// Images saved or classified at least once this session
    done: BTreeSet<PathBuf>,

    /// Loaded image texture for display
    texture: Option<egui::TextureHandle>,

    /// Label request for a freshly drawn box
    prompt: LabelPrompt,

    /// Text field for new label names
    new_label: String,

    /// Text field for new category names
    new_category: String,

    /// Category picked for the current image
    chosen_category: String,

    /// Last message for the status bar
    status: String,
}

impl BoxlabApp {
    /// Create the application and open `images`. Without a configured mode
    /// the mode selection screen is shown first.
    pub fn new(ctx: &egui::Context, config: Config, images: Vec<PathBuf>) -> Self {
        let mut app = Self {
            mode: None,
            mode_choice: config.mode.unwrap_or(Mode::Classification),
            seed_labels: config.labels.clone(),
            store: AnnotationStore::new(&config.output_dir, LabelRegistry::new()),
            categories: CategoryStore::new(&config.classification_dir),
            canvas: ImageCanvas::new(config.canvas_settings()),
            pointer: PointerTracker::new(),
            images,
            current: None,
            done: BTreeSet::new(),
            texture: None,
            prompt: LabelPrompt::default(),
            new_label: String::new(),
            new_category: String::new(),
            chosen_category: String::new(),
            status: String::from("Open images to begin"),
        };

        if let Some(mode) = config.mode {
            app.enter_mode(mode, ctx);
        }
        app
    }

    /// Start the session in `mode`, reading the dataset already on disk.
    fn enter_mode(&mut self, mode: Mode, ctx: &egui::Context) {
        self.mode = Some(mode);
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
            "Boxlab - {} Tool",
            mode.title()
        )));
        log::info!("Starting in {} mode", mode.title());

        match mode {
            Mode::Detection => self.restore_classes(),
            Mode::Classification => self.restore_categories(),
        }

        let images = std::mem::take(&mut self.images);
        self.open_images(images, ctx);
    }

    fn restore_classes(&mut self) {
        match self.store.restore(&self.seed_labels) {
            Ok(true) => log::info!("Restored classes from {}", self.store.classes_path().display()),
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed to prepare output directory: {}", e);
                self.status = format!("Output directory unavailable: {}", e);
            }
        }
    }

    fn restore_categories(&mut self) {
        if let Err(e) = self.categories.scan_categories() {
            log::error!("Failed to read category folders: {}", e);
            self.status = format!("Output directory unavailable: {}", e);
        }
    }

    fn mode(&self) -> Mode {
        self.mode.unwrap_or(Mode::Detection)
    }

    /// Replace the session's image list and show the first image.
    fn open_images(&mut self, images: Vec<PathBuf>, ctx: &egui::Context) {
        if images.is_empty() {
            return;
        }
        self.images = images;
        self.done.clear();
        log::info!("Opened {} image(s)", self.images.len());
        self.show_image(0, ctx);
    }

    fn open_folder(&mut self, dir: &Path, ctx: &egui::Context) {
        match media::list_images(dir) {
            Ok(images) if images.is_empty() => {
                self.status = format!("No images found in {}", dir.display());
            }
            Ok(images) => self.open_images(images, ctx),
            Err(e) => {
                log::error!("Failed to read folder: {}", e);
                self.status = format!("Failed to read folder: {}", dir.display());
            }
        }
    }

    /// Forget the image list, e.g. once every image has been classified.
    fn clear_session(&mut self) {
        self.images.clear();
        self.done.clear();
        self.current = None;
        self.texture = None;
        self.canvas.clear_image();
    }

    fn current_path(&self) -> Option<&Path> {
        self.current
            .and_then(|i| self.images.get(i))
            .map(PathBuf::as_path)
    }

    /// Load image `index`, its texture and any saved annotations.
    fn show_image(&mut self, index: usize, ctx: &egui::Context) {
        let Some(path) = self.images.get(index).cloned() else {
            return;
        };
        self.current = Some(index);

        let loaded = match media::load_image(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::error!("{}", e);
                self.status = format!("Failed to load image: {}", path.display());
                self.texture = None;
                self.canvas.clear_image();
                return;
            }
        };

        let size = [loaded.width as usize, loaded.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
        self.texture = Some(ctx.load_texture(
            "current_image",
            color_image,
            egui::TextureOptions::LINEAR,
        ));
        self.canvas.handle(CanvasInput::ImageLoaded {
            width: loaded.width,
            height: loaded.height,
        });

        if self.mode() == Mode::Detection {
            match self
                .store
                .load_annotations(&path, loaded.width, loaded.height)
            {
                Ok(boxes) => self.canvas.set_boxes(boxes),
                Err(e) => log::error!("Failed to load annotations: {}", e),
            }
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.status = format!(
            "File: {} | Size: {}x{}",
            file_name, loaded.width, loaded.height
        );
        log::info!(
            "Loaded image: {} ({}x{})",
            path.display(),
            loaded.width,
            loaded.height
        );
    }

    fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.images.len())
    }

    fn next_image(&mut self, ctx: &egui::Context) {
        if let Some(index) = self.current.filter(|_| self.has_next()) {
            self.show_image(index + 1, ctx);
        }
    }

    fn previous_image(&mut self, ctx: &egui::Context) {
        if let Some(index) = self.current.filter(|&i| i > 0) {
            self.show_image(index - 1, ctx);
        }
    }

    /// Save the current image's boxes and copy the image into the dataset.
    fn save_current(&mut self) -> bool {
        let (Some(path), Some((width, height))) =
            (self.current_path().map(Path::to_path_buf), self.canvas.image_size())
        else {
            return false;
        };

        if self.canvas.boxes().is_empty() {
            self.status = "There are no bounding boxes to save for this image.".to_string();
            return false;
        }
        if self.canvas.state() != InteractionState::Idle {
            self.status = "Finish the current gesture before saving.".to_string();
            return false;
        }

        if let Err(e) = self
            .store
            .save_annotations(&path, self.canvas.boxes(), width, height)
        {
            log::error!("Failed to save annotations: {}", e);
            self.status = "Failed to save annotations.".to_string();
            return false;
        }

        if let Err(e) = self.store.copy_image_to_output(&path) {
            log::error!("Failed to copy image to output: {}", e);
        }
        self.done.insert(path);
        self.status = "Annotations saved successfully!".to_string();
        true
    }

    /// Copy the current image into `category` and move on. The session is
    /// cleared after the last image.
    fn classify_current(&mut self, category: &str, ctx: &egui::Context) {
        let Some(path) = self.current_path().map(Path::to_path_buf) else {
            return;
        };

        match self.categories.classify_image(&path, category) {
            Ok(dest) => {
                self.done.insert(path);
                let message = format!(
                    "Image classified as '{}' and copied to {}",
                    category,
                    dest.display()
                );
                if self.has_next() {
                    self.next_image(ctx);
                    self.status = message;
                } else {
                    self.clear_session();
                    self.status = format!("{}. All images have been processed!", message);
                }
            }
            Err(e) => {
                log::error!("Failed to classify image: {}", e);
                self.status = format!("Failed to classify image: {}", e);
            }
        }
    }

    fn add_label(&mut self, name: &str) {
        if !name.is_empty() {
            self.new_label.clear();
        }
        self.status = register_label(self.store.labels_mut(), name);
    }

    fn add_category(&mut self, name: &str) {
        if name.is_empty() {
            self.status = "Please enter a category name.".to_string();
            return;
        }

        match self.categories.add_category(name) {
            Ok(added) => {
                self.status = if added {
                    format!("Category '{}' added.", name)
                } else {
                    format!("Category '{}' already exists.", name)
                };
                self.chosen_category = name.to_string();
                self.new_category.clear();
            }
            Err(e) => {
                log::error!("Failed to add category: {}", e);
                self.status = e.to_string();
            }
        }
    }

    fn set_output_dir(&mut self, dir: PathBuf) {
        match self.mode() {
            Mode::Detection => {
                self.store.set_output_dir(dir);
                self.restore_classes();
            }
            Mode::Classification => {
                self.categories.set_output_dir(dir);
                self.restore_categories();
            }
        }
        let current = match self.mode() {
            Mode::Detection => self.store.output_dir(),
            Mode::Classification => self.categories.output_dir(),
        };
        self.status = format!("Output folder: {}", current.display());
    }

    fn handle_canvas_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::BoxCreated(rect) => {
                let labels = self.store.labels();
                let Some((_, first)) = labels.labels().next() else {
                    self.status =
                        "Please create at least one label before drawing bounding boxes."
                            .to_string();
                    return;
                };
                self.prompt.open(rect, first);
            }
            CanvasEvent::BoxSelected(index) => {
                log::debug!("Selection changed to {:?}", index);
            }
            CanvasEvent::BoxModified(index) => {
                log::trace!("Box {} resized", index);
            }
            CanvasEvent::BoxRemoved(index) => {
                self.status = format!("Deleted box {}.", index + 1);
            }
        }
    }

    /// Feed this frame's pointer input to the canvas engine and draw it.
    fn canvas_ui(&mut self, ui: &mut egui::Ui) -> Vec<CanvasEvent> {
        let interactive = self.mode() == Mode::Detection;
        let sense = if interactive {
            egui::Sense::click_and_drag()
        } else {
            egui::Sense::hover()
        };
        let (response, painter) = ui.allocate_painter(ui.available_size(), sense);
        let area = response.rect;
        self.canvas
            .resize_viewport(f64::from(area.width()), f64::from(area.height()));

        let mut events = Vec::new();
        if interactive && !self.prompt.is_open() {
            let to_canvas = |pos: egui::Pos2| {
                Point::new(f64::from(pos.x - area.min.x), f64::from(pos.y - area.min.y))
            };
            let frame = ui.input(|i| PointerFrame {
                pressed: i.pointer.primary_pressed(),
                released: i.pointer.primary_released(),
                down: i.pointer.primary_down(),
                moved: i.pointer.delta() != egui::Vec2::ZERO,
                hovered: response.hovered(),
                pos: i.pointer.interact_pos().map(to_canvas),
            });
            events = self.pointer.feed(&mut self.canvas, frame);
        }

        painter.rect_filled(area, egui::Rounding::ZERO, egui::Color32::from_gray(40));
        match (&self.texture, painter::image_rect(&self.canvas, area.min)) {
            (Some(texture), Some(image_rect)) => {
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                if interactive {
                    painter::paint_boxes(&painter, &self.canvas, area.min);
                }
            }
            _ => {
                painter.text(
                    area.center(),
                    egui::Align2::CENTER_CENTER,
                    "No image loaded",
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_gray(160),
                );
            }
        }

        events
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Images...").clicked() {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter("Images", &media::IMAGE_EXTENSIONS)
                            .pick_files()
                        {
                            self.open_images(paths, ctx);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Folder...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.open_folder(&dir, ctx);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Set Output Folder...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.set_output_dir(dir);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    /// Labels and boxes panel, plus label and box shortcuts.
    fn detection_panels(&mut self, ctx: &egui::Context) {
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| {
                properties::show(
                    ui,
                    self.store.labels(),
                    &mut self.new_label,
                    self.canvas.boxes(),
                    self.canvas.selected_index(),
                )
            })
            .inner;

        match properties_action {
            PropertiesAction::AddLabel(name) => self.add_label(&name),
            PropertiesAction::RemoveLabel(name) => {
                self.store.labels_mut().remove_label(&name);
                self.status = format!("Label '{}' removed.", name);
            }
            PropertiesAction::SelectBox(index) => self.canvas.set_selected(Some(index)),
            PropertiesAction::DeleteBox(index) => {
                if self.canvas.remove_box(index).is_some() {
                    self.status = format!("Deleted box {}.", index + 1);
                }
            }
            PropertiesAction::None => {}
        }

        // Keyboard shortcuts, unless a text field has focus
        if !ctx.wants_keyboard_input() && !self.prompt.is_open() {
            if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
            {
                if let Some(event) = self.canvas.handle(CanvasInput::KeyDelete) {
                    self.handle_canvas_event(event);
                }
            }
            if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) {
                self.save_current();
            }
        }
    }

    fn classification_panel(&mut self, ctx: &egui::Context) {
        let has_image = self.current.is_some();
        let action = egui::SidePanel::right("categories")
            .default_width(260.0)
            .show(ctx, |ui| {
                classifier::show(
                    ui,
                    &self.categories,
                    &mut self.new_category,
                    &mut self.chosen_category,
                    has_image,
                )
            })
            .inner;

        match action {
            ClassifierAction::AddCategory(name) => self.add_category(&name),
            ClassifierAction::Classify(category) => self.classify_current(&category, ctx),
            ClassifierAction::None => {}
        }
    }
}

/// Register `name` typed in the labels panel. Returns the status message.
fn register_label(labels: &mut LabelRegistry, name: &str) -> String {
    if name.is_empty() {
        return "Please enter a label name.".to_string();
    }
    if labels.contains(name) {
        return format!("Label '{}' already exists.", name);
    }

    let id = labels.add_label(name);
    format!("Label '{}' added as class {}.", name, id)
}

impl eframe::App for BoxlabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Some(mode) = self.mode else {
            let chosen = egui::CentralPanel::default()
                .show(ctx, |ui| mode_select::show(ui, &mut self.mode_choice))
                .inner;
            if let Some(mode) = chosen {
                self.enter_mode(mode, ctx);
            }
            return;
        };

        self.menu_bar(ctx);

        // Navigation toolbar
        let progress = Progress {
            current: self.current,
            total: self.images.len(),
            done: self.done.len(),
            mode,
        };
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &progress))
            .inner;

        match toolbar_action {
            ToolbarAction::Previous => self.previous_image(ctx),
            ToolbarAction::Next | ToolbarAction::Skip => self.next_image(ctx),
            ToolbarAction::Save => {
                self.save_current();
            }
            ToolbarAction::SaveAndNext => {
                self.save_current();
                self.next_image(ctx);
            }
            ToolbarAction::None => {}
        }

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(&self.status);
        });

        match mode {
            Mode::Detection => self.detection_panels(ctx),
            Mode::Classification => self.classification_panel(ctx),
        }

        // Main canvas (center)
        let canvas_events = egui::CentralPanel::default()
            .show(ctx, |ui| self.canvas_ui(ui))
            .inner;
        for event in canvas_events {
            self.handle_canvas_event(event);
        }

        // Label prompt for a freshly drawn box
        match self.prompt.show(ctx, self.store.labels()) {
            PromptAction::Confirm { rect, label } => {
                let class_id = self.store.labels().class_id_of(&label);
                self.canvas.add_box(BoundingBox::new(rect, label, class_id));
            }
            PromptAction::Cancel => log::debug!("Label prompt cancelled, box discarded"),
            PromptAction::None => {}
        }
    }
}
