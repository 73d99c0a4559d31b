// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the letterbox transform between canvas (screen)
//! coordinates and image-pixel coordinates.

use crate::models::{Pixel, Rect};

/// A point in canvas coordinates, relative to the canvas' top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Uniform scale plus offset that fits an image inside a viewport while
/// preserving its aspect ratio, centered on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f64,
    origin: Point,
    image_width: u32,
    image_height: u32,
}

impl ViewTransform {
    /// Fit an `image_width x image_height` image into a viewport, leaving at
    /// least `margin` pixels of room in total on each axis.
    ///
    /// Returns `None` when there is nothing to show: an empty image, or a
    /// viewport too small to hold any of it.
    pub fn fit(
        viewport_width: f64,
        viewport_height: f64,
        image_width: u32,
        image_height: u32,
        margin: f64,
    ) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }

        let scale_x = (viewport_width - margin) / f64::from(image_width);
        let scale_y = (viewport_height - margin) / f64::from(image_height);
        let scale = scale_x.min(scale_y);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        let scaled_width = f64::from(image_width) * scale;
        let scaled_height = f64::from(image_height) * scale;

        Some(Self {
            scale,
            origin: Point::new(
                (viewport_width - scaled_width) / 2.0,
                (viewport_height - scaled_height) / 2.0,
            ),
            image_width,
            image_height,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Canvas position of the image's top-left pixel.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Size of the scaled image on the canvas.
    pub fn display_size(&self) -> (f64, f64) {
        (
            f64::from(self.image_width) * self.scale,
            f64::from(self.image_height) * self.scale,
        )
    }

    /// Whether a canvas point falls on the displayed image.
    pub fn contains(&self, point: Point) -> bool {
        let (w, h) = self.display_size();
        point.x >= self.origin.x
            && point.x < self.origin.x + w
            && point.y >= self.origin.y
            && point.y < self.origin.y + h
    }

    pub fn screen_to_image(&self, point: Point) -> Pixel {
        Pixel::new(
            ((point.x - self.origin.x) / self.scale).floor() as i32,
            ((point.y - self.origin.y) / self.scale).floor() as i32,
        )
    }

    pub fn image_to_screen(&self, pixel: Pixel) -> Point {
        Point::new(
            f64::from(pixel.x) * self.scale + self.origin.x,
            f64::from(pixel.y) * self.scale + self.origin.y,
        )
    }

    /// Canvas-space `(min, max)` corners of an image-space rectangle.
    pub fn rect_to_screen(&self, rect: &Rect) -> (Point, Point) {
        (
            self.image_to_screen(Pixel::new(rect.left, rect.top)),
            self.image_to_screen(Pixel::new(rect.right(), rect.bottom())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_letterboxes_wide_image() {
        // 800x400 image into a 420x420 viewport with a 20px margin: scale 0.5,
        // 400x200 on screen, centered vertically.
        let view = ViewTransform::fit(420.0, 420.0, 800, 400, 20.0).expect("fits");
        assert_eq!(view.scale(), 0.5);
        assert_eq!(view.origin(), Point::new(10.0, 110.0));
        assert_eq!(view.display_size(), (400.0, 200.0));
    }

    #[test]
    fn test_screen_image_roundtrip() {
        let view = ViewTransform::fit(980.0, 700.0, 1920, 1080, 20.0).expect("fits");
        let pixel = Pixel::new(960, 540);
        let screen = view.image_to_screen(pixel);
        assert_eq!(view.screen_to_image(screen), pixel);
    }

    #[test]
    fn test_screen_to_image_at_origin_is_zero() {
        let view = ViewTransform::fit(420.0, 420.0, 800, 400, 20.0).expect("fits");
        assert_eq!(view.screen_to_image(view.origin()), Pixel::new(0, 0));
        assert!(view.contains(view.origin()));
        assert!(!view.contains(Point::new(5.0, 200.0)));
        assert!(!view.contains(Point::new(200.0, 100.0)));
    }

    #[test]
    fn test_fit_rejects_degenerate_inputs() {
        assert!(ViewTransform::fit(400.0, 300.0, 0, 100, 20.0).is_none());
        assert!(ViewTransform::fit(10.0, 300.0, 100, 100, 20.0).is_none());
    }
}
