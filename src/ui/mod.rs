// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas interaction engine and the egui components around it.

pub mod canvas;
pub mod classifier;
pub mod label_prompt;
pub mod mode_select;
pub mod painter;
pub mod pointer;
pub mod properties;
pub mod toolbar;

pub use canvas::{CanvasEvent, CanvasInput, CanvasSettings, ImageCanvas, InteractionState};
