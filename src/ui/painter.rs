// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Box rendering on top of the displayed image.

use crate::ui::canvas::{palette_index, ImageCanvas, PALETTE_SIZE};
use crate::util::geometry::Point;
use egui::{Color32, FontId, Pos2, Rounding, Shape, Stroke};

/// Box colors, indexed by the box's position in the list.
pub const PALETTE: [Color32; PALETTE_SIZE] = [
    Color32::from_rgb(0, 255, 0),
    Color32::from_rgb(255, 0, 0),
    Color32::from_rgb(0, 0, 255),
    Color32::from_rgb(255, 255, 0),
    Color32::from_rgb(255, 0, 255),
    Color32::from_rgb(0, 255, 255),
    Color32::from_rgb(255, 128, 0),
    Color32::from_rgb(128, 0, 255),
];

const STROKE_WIDTH: f32 = 2.0;
const SELECTED_STROKE_WIDTH: f32 = 3.0;
const HANDLE_RADIUS: f32 = 4.0;
const LABEL_FONT_SIZE: f32 = 13.0;

pub fn box_color(index: usize) -> Color32 {
    PALETTE[palette_index(index)]
}

fn to_pos(origin: Pos2, point: Point) -> Pos2 {
    origin + egui::vec2(point.x as f32, point.y as f32)
}

/// Where the scaled image sits on screen, given the canvas' top-left corner.
pub fn image_rect(canvas: &ImageCanvas, origin: Pos2) -> Option<egui::Rect> {
    let view = canvas.view()?;
    let (w, h) = view.display_size();
    let min = to_pos(origin, view.origin());
    Some(egui::Rect::from_min_size(min, egui::vec2(w as f32, h as f32)))
}

/// Draw every box, its label tag, corner handles for the selected box, and
/// the rectangle of a drawing gesture in progress.
pub fn paint_boxes(painter: &egui::Painter, canvas: &ImageCanvas, origin: Pos2) {
    let Some(view) = canvas.view() else {
        return;
    };

    for (index, bbox) in canvas.boxes().iter().enumerate() {
        let color = box_color(index);
        let (min, max) = view.rect_to_screen(&bbox.rect);
        let rect = egui::Rect::from_min_max(to_pos(origin, min), to_pos(origin, max));

        let width = if bbox.selected {
            SELECTED_STROKE_WIDTH
        } else {
            STROKE_WIDTH
        };
        painter.rect_stroke(rect, Rounding::ZERO, Stroke::new(width, color));

        if !bbox.label.is_empty() {
            let galley = painter.layout_no_wrap(
                bbox.label.clone(),
                FontId::proportional(LABEL_FONT_SIZE),
                Color32::BLACK,
            );
            let padding = egui::vec2(4.0, 2.0);
            let tag_size = galley.size() + padding * 2.0;
            let tag = egui::Rect::from_min_size(
                rect.left_top() - egui::vec2(0.0, tag_size.y),
                tag_size,
            );
            painter.rect_filled(tag, Rounding::ZERO, color);
            painter.galley(tag.min + padding, galley, Color32::BLACK);
        }

        if bbox.selected {
            for corner in [
                rect.left_top(),
                rect.right_top(),
                rect.left_bottom(),
                rect.right_bottom(),
            ] {
                painter.circle_filled(corner, HANDLE_RADIUS, color);
            }
        }
    }

    if let Some(draft) = canvas.candidate_rect() {
        let (min, max) = view.rect_to_screen(&draft);
        let rect = egui::Rect::from_min_max(to_pos(origin, min), to_pos(origin, max));
        let outline = [
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
            rect.left_top(),
        ];
        painter.extend(Shape::dashed_line(
            &outline,
            Stroke::new(STROKE_WIDTH, Color32::GREEN),
            6.0,
            4.0,
        ));
    }
}
