// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Boxlab - image labeling for machine learning datasets.
//!
//! In object detection mode users draw rectangles over images, give each
//! one a label, and the boxes are saved in YOLO text format next to a shared
//! class list. In image classification mode each whole image is copied into
//! the folder of its category.
//!
//! # Modules
//!
//! - [`models`]: bounding box geometry and the label registry
//! - [`io`]: annotation files, class list, category folders and image loading
//! - [`ui`]: the canvas interaction engine and egui components
//! - [`app`]: the egui application wiring everything together

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod ui;
pub mod util;

pub use error::StoreError;
