// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read from a YAML file; every field has a default so a partial file, or
//! no file at all, is valid.

use crate::error::StoreError;
use crate::ui::canvas::CanvasSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which kind of dataset the session builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Draw labeled boxes, saved in YOLO format.
    Detection,
    /// File each whole image under one category folder.
    Classification,
}

impl Mode {
    pub fn title(self) -> &'static str {
        match self {
            Mode::Detection => "Object Detection",
            Mode::Classification => "Image Classification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Mode to start in. Unset means the user picks one at startup.
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Dataset root receiving `images/`, `labels/` and `classes.txt`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Root of the per-category folders in classification mode.
    #[serde(default = "default_classification_dir")]
    pub classification_dir: PathBuf,
    /// Corner grab distance, in image pixels.
    #[serde(default = "default_corner_threshold")]
    pub corner_threshold: f64,
    /// Minimum width and height of a drawn box, in image pixels (exclusive).
    #[serde(default = "default_min_box_size")]
    pub min_box_size: i32,
    /// Room left around the fitted image, in screen pixels.
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,
    /// Labels registered at startup, after `classes.txt` is read. Labels
    /// already in the class list keep their ids.
    #[serde(default)]
    pub labels: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("annotated_images")
}

fn default_classification_dir() -> PathBuf {
    PathBuf::from("classified_images")
}

fn default_corner_threshold() -> f64 {
    crate::models::bounding_box::CORNER_THRESHOLD
}

fn default_min_box_size() -> i32 {
    10
}

fn default_viewport_margin() -> f64 {
    20.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: None,
            output_dir: default_output_dir(),
            classification_dir: default_classification_dir(),
            corner_threshold: default_corner_threshold(),
            min_box_size: default_min_box_size(),
            viewport_margin: default_viewport_margin(),
            labels: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        serde_yaml::from_str(&content).map_err(|source| StoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn canvas_settings(&self) -> CanvasSettings {
        CanvasSettings {
            corner_threshold: self.corner_threshold,
            min_box_size: self.min_box_size,
            viewport_margin: self.viewport_margin,
        }
    }
}
