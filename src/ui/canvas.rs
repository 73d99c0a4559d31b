// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas interaction engine.
//!
//! Owns the boxes of the image on display and turns pointer and keyboard
//! input into box creation, selection, resizing and deletion. Input arrives
//! in canvas coordinates; every stored rectangle stays in image pixels so
//! boxes are unaffected by viewport resizes.
//!
//! The engine never talks to the UI directly. Each input returns an
//! optional [`CanvasEvent`] for the surrounding application to act on.

use crate::models::{BoundingBox, ClassId, Corner, Pixel, Rect};
use crate::util::geometry::{Point, ViewTransform};

/// Number of entries in the box color palette.
pub const PALETTE_SIZE: usize = 8;

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing,
    Resizing,
    /// A press landed on a box. The box is selected; dragging does not
    /// move it.
    Moving,
}

/// Input delivered by the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasInput {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    KeyDelete,
    ViewportResize { width: f64, height: f64 },
    ImageLoaded { width: u32, height: u32 },
}

/// Notification for the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A drawing gesture finished. The host must obtain a label and hand
    /// the box back through [`ImageCanvas::add_box`].
    BoxCreated(Rect),
    BoxSelected(Option<usize>),
    BoxModified(usize),
    BoxRemoved(usize),
}

/// Tunables for hit testing and box creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSettings {
    /// Corner grab distance, in image pixels.
    pub corner_threshold: f64,
    /// A drawn box must be strictly wider and taller than this, in image pixels.
    pub min_box_size: i32,
    /// Total room left around the fitted image, in canvas pixels.
    pub viewport_margin: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            corner_threshold: crate::models::bounding_box::CORNER_THRESHOLD,
            min_box_size: 10,
            viewport_margin: 20.0,
        }
    }
}

/// Palette slot for the box at `index`. Colors follow list position, not
/// class id.
pub fn palette_index(index: usize) -> usize {
    index % PALETTE_SIZE
}

/// Boxes of one image plus the pointer state machine that edits them.
#[derive(Debug, Default)]
pub struct ImageCanvas {
    settings: CanvasSettings,
    state: InteractionState,
    viewport: (f64, f64),
    image_size: Option<(u32, u32)>,
    view: Option<ViewTransform>,
    boxes: Vec<BoundingBox>,
    selected: Option<usize>,
    resizing_corner: Option<Corner>,
    drag_start: Pixel,
    candidate: Option<Rect>,
}

impl ImageCanvas {
    pub fn new(settings: CanvasSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn view(&self) -> Option<&ViewTransform> {
        self.view.as_ref()
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Rectangle being drawn, if a drawing gesture is in progress.
    pub fn candidate_rect(&self) -> Option<Rect> {
        self.candidate
    }

    /// Dispatch one input to the matching handler.
    pub fn handle(&mut self, input: CanvasInput) -> Option<CanvasEvent> {
        match input {
            CanvasInput::PointerDown(p) => self.pointer_down(p),
            CanvasInput::PointerMove(p) => self.pointer_move(p),
            CanvasInput::PointerUp(p) => self.pointer_up(p),
            CanvasInput::KeyDelete => self.delete_selected(),
            CanvasInput::ViewportResize { width, height } => {
                self.resize_viewport(width, height);
                None
            }
            CanvasInput::ImageLoaded { width, height } => {
                self.set_image(width, height);
                None
            }
        }
    }

    /// Show a new image. Boxes from the previous image are dropped.
    pub fn set_image(&mut self, width: u32, height: u32) {
        self.image_size = Some((width, height));
        self.clear_boxes();
        self.reset_gesture();
        self.update_view();
    }

    pub fn clear_image(&mut self) {
        self.image_size = None;
        self.view = None;
        self.clear_boxes();
        self.reset_gesture();
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        self.update_view();
    }

    fn update_view(&mut self) {
        self.view = self.image_size.and_then(|(w, h)| {
            ViewTransform::fit(
                self.viewport.0,
                self.viewport.1,
                w,
                h,
                self.settings.viewport_margin,
            )
        });
    }

    pub fn add_box(&mut self, bbox: BoundingBox) {
        log::info!("Added box {} '{}'", bbox.rect, bbox.label);
        self.boxes.push(BoundingBox {
            selected: false,
            ..bbox
        });
    }

    /// Remove the box at `index`, keeping the selection on the same box when
    /// it sits further down the list.
    pub fn remove_box(&mut self, index: usize) -> Option<BoundingBox> {
        if index >= self.boxes.len() {
            return None;
        }
        let removed = self.boxes.remove(index);
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        log::info!("Removed box {}, {} left", index, self.boxes.len());
        Some(removed)
    }

    pub fn clear_boxes(&mut self) {
        self.boxes.clear();
        self.selected = None;
    }

    /// Replace the box list, e.g. after loading annotations from disk.
    pub fn set_boxes(&mut self, boxes: Vec<BoundingBox>) {
        self.boxes = boxes;
        self.set_selected(None);
    }

    /// Select the box at `index`, or nothing. Out-of-range indices clear the
    /// selection.
    pub fn set_selected(&mut self, index: Option<usize>) {
        let index = index.filter(|&i| i < self.boxes.len());
        self.selected = index;
        for (i, bbox) in self.boxes.iter_mut().enumerate() {
            bbox.selected = Some(i) == index;
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selected(None);
    }

    /// Reassign the label of an existing box.
    pub fn relabel(&mut self, index: usize, label: &str, class_id: Option<ClassId>) -> bool {
        let Some(bbox) = self.boxes.get_mut(index) else {
            return false;
        };
        bbox.label = label.to_string();
        bbox.class_id = class_id;
        true
    }

    /// Topmost box containing `point`: later boxes win over earlier ones.
    pub fn box_at(&self, point: Pixel) -> Option<usize> {
        self.boxes.iter().rposition(|bbox| bbox.contains(point))
    }

    /// Map a canvas point onto the image, if it lands on the image.
    fn image_point(&self, point: Point) -> Option<Pixel> {
        let view = self.view.as_ref()?;
        view.contains(point).then(|| view.screen_to_image(point))
    }

    pub fn pointer_down(&mut self, point: Point) -> Option<CanvasEvent> {
        let pixel = self.image_point(point)?;

        if let Some(sel) = self.selected {
            let corner = self.boxes[sel].nearest_corner(pixel, self.settings.corner_threshold);
            if let Some(corner) = corner {
                log::debug!("Resizing box {} from {:?}", sel, corner);
                self.state = InteractionState::Resizing;
                self.resizing_corner = Some(corner);
                self.drag_start = pixel;
                return None;
            }
        }

        if let Some(index) = self.box_at(pixel) {
            self.set_selected(Some(index));
            self.state = InteractionState::Moving;
            self.drag_start = pixel;
            log::debug!("Selected box {}", index);
            return Some(CanvasEvent::BoxSelected(Some(index)));
        }

        let had_selection = self.selected.is_some();
        self.clear_selection();
        self.state = InteractionState::Drawing;
        self.drag_start = pixel;
        self.candidate = None;
        log::debug!("Drawing from ({}, {})", pixel.x, pixel.y);

        had_selection.then_some(CanvasEvent::BoxSelected(None))
    }

    pub fn pointer_move(&mut self, point: Point) -> Option<CanvasEvent> {
        let pixel = self.image_point(point)?;

        match self.state {
            InteractionState::Drawing => {
                self.candidate = Some(Rect::from_points(self.drag_start, pixel));
                None
            }
            InteractionState::Resizing => {
                let sel = self.selected?;
                let corner = self.resizing_corner?;
                let bbox = &mut self.boxes[sel];
                bbox.rect = bbox.rect.with_corner(corner, pixel);

                // Crossing the opposite corner flips which corner is held.
                self.resizing_corner = Corner::ALL
                    .into_iter()
                    .find(|&c| bbox.rect.corner(c) == pixel)
                    .or(Some(corner));
                Some(CanvasEvent::BoxModified(sel))
            }
            InteractionState::Moving | InteractionState::Idle => None,
        }
    }

    pub fn pointer_up(&mut self, point: Point) -> Option<CanvasEvent> {
        if self.state == InteractionState::Drawing {
            if let Some(pixel) = self.image_point(point) {
                self.candidate = Some(Rect::from_points(self.drag_start, pixel));
            }
        }

        let event = match (self.state, self.candidate) {
            (InteractionState::Drawing, Some(rect))
                if rect.width > self.settings.min_box_size
                    && rect.height > self.settings.min_box_size =>
            {
                log::debug!("Box drawn at {}", rect);
                Some(CanvasEvent::BoxCreated(rect))
            }
            _ => None,
        };

        self.reset_gesture();
        event
    }

    /// Remove the selected box, if any.
    pub fn delete_selected(&mut self) -> Option<CanvasEvent> {
        let index = self.selected?;
        self.remove_box(index)?;
        Some(CanvasEvent::BoxRemoved(index))
    }

    fn reset_gesture(&mut self) {
        self.state = InteractionState::Idle;
        self.resizing_corner = None;
        self.candidate = None;
    }
}
