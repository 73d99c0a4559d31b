// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame pointer state to canvas input.
//!
//! egui reports the pointer once per frame, and loses its position when the
//! pointer leaves the window. The tracker remembers the last position seen
//! over the canvas so a gesture always ends when the button does.

use crate::ui::canvas::{CanvasEvent, CanvasInput, ImageCanvas, InteractionState};
use crate::util::geometry::Point;

/// Primary-button pointer state of one frame, in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerFrame {
    pub pressed: bool,
    pub released: bool,
    /// Button currently held.
    pub down: bool,
    pub moved: bool,
    /// Pointer over the canvas when the frame started.
    pub hovered: bool,
    pub pos: Option<Point>,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    last_pos: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pos(&self) -> Option<Point> {
        self.last_pos
    }

    /// Deliver this frame's input to `canvas` and collect what it reports.
    pub fn feed(&mut self, canvas: &mut ImageCanvas, frame: PointerFrame) -> Vec<CanvasEvent> {
        let mut events = Vec::new();

        if let Some(pos) = frame.pos {
            self.last_pos = Some(pos);
            if frame.pressed && frame.hovered {
                events.extend(canvas.handle(CanvasInput::PointerDown(pos)));
            }
            if frame.moved && canvas.state() != InteractionState::Idle {
                events.extend(canvas.handle(CanvasInput::PointerMove(pos)));
            }
        }

        // A release can arrive without a position, or get lost outside the
        // window entirely. Either way the gesture ends here.
        let ended = frame.released || !frame.down;
        if ended && canvas.state() != InteractionState::Idle {
            let pos = frame.pos.or(self.last_pos).unwrap_or_default();
            events.extend(canvas.handle(CanvasInput::PointerUp(pos)));
        }

        events
    }
}
