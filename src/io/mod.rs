// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, annotation files and category folders.

pub mod annotation_store;
pub mod category_store;
pub mod media;

pub use annotation_store::{AnnotationStore, CopyOutcome};
pub use category_store::CategoryStore;
