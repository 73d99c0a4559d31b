// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data model.

pub mod bounding_box;
pub mod labels;

pub use bounding_box::{BoundingBox, ClassId, Corner, NormalizedBox, Pixel, Rect};
pub use labels::LabelRegistry;
