// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Boxlab - bounding box labeling tool.
//!
//! A cross-platform desktop application for preparing machine learning
//! datasets: labeled bounding boxes saved in YOLO format, or whole images
//! sorted into category folders.

use anyhow::{Context, Result};
use boxlab::app::BoxlabApp;
use boxlab::config::{Config, Mode};
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments.
#[derive(Parser)]
#[command(name = "boxlab", version, about)]
struct Args {
    /// Configuration file (YAML). Defaults apply if it does not exist.
    #[arg(long, default_value = "boxlab.yaml")]
    config: PathBuf,

    /// Session mode. Without it the mode is asked for at startup.
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Dataset output directory, overriding the config file.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Images to open at startup.
    images: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if let Some(mode) = args.mode {
        config.mode = Some(mode);
    }
    if let Some(output_dir) = args.output_dir {
        config.classification_dir = output_dir.clone();
        config.output_dir = output_dir;
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Boxlab - ML Dataset Preparation Tool"),
        ..Default::default()
    };

    let images = args.images;

    // Run the application
    eframe::run_native(
        "Boxlab",
        options,
        Box::new(move |cc| Ok(Box::new(BoxlabApp::new(&cc.egui_ctx, config, images)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
