// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box data structures.
//!
//! This module defines the axis-aligned rectangles users draw over an image,
//! their labels, and the conversion between pixel space and the normalized
//! center/size format written to annotation files.

use std::fmt;

/// Default distance (in image pixels) within which a point grabs a corner.
pub const CORNER_THRESHOLD: f64 = 10.0;

/// A point in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: Pixel) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// One of the four corners of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Hit-test order used by [`Rect::nearest_corner`].
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// An axis-aligned rectangle in image-pixel coordinates.
///
/// The right and bottom edges sit at `left + width` and `top + height`;
/// those edges are excluded by [`Rect::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rectangle spanning two arbitrary points, whatever the drag
    /// direction was. Width and height are never negative.
    pub fn from_points(a: Pixel, b: Pixel) -> Self {
        Self::from_edges(a.x, a.y, b.x, b.y)
    }

    fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let left = x0.min(x1);
        let top = y0.min(y1);
        Self {
            left,
            top,
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Position of the given corner.
    pub fn corner(&self, corner: Corner) -> Pixel {
        match corner {
            Corner::TopLeft => Pixel::new(self.left, self.top),
            Corner::TopRight => Pixel::new(self.right(), self.top),
            Corner::BottomLeft => Pixel::new(self.left, self.bottom()),
            Corner::BottomRight => Pixel::new(self.right(), self.bottom()),
        }
    }

    /// Move one corner to `point`, keeping the opposite corner fixed.
    ///
    /// Dragging a corner across the opposite edge swaps the edges so the
    /// result always has a non-negative width and height.
    pub fn with_corner(&self, corner: Corner, point: Pixel) -> Self {
        let (mut x0, mut y0, mut x1, mut y1) = (self.left, self.top, self.right(), self.bottom());
        match corner {
            Corner::TopLeft => {
                x0 = point.x;
                y0 = point.y;
            }
            Corner::TopRight => {
                x1 = point.x;
                y0 = point.y;
            }
            Corner::BottomLeft => {
                x0 = point.x;
                y1 = point.y;
            }
            Corner::BottomRight => {
                x1 = point.x;
                y1 = point.y;
            }
        }
        Self::from_edges(x0, y0, x1, y1)
    }

    /// Half-open containment: `[left, right) x [top, bottom)`.
    pub fn contains(&self, point: Pixel) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    /// First corner within `threshold` pixels of `point` (boundary inclusive),
    /// tested in the order of [`Corner::ALL`].
    pub fn nearest_corner(&self, point: Pixel, threshold: f64) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|&corner| point.distance_to(self.corner(corner)) <= threshold)
    }

    /// Convert to normalized center/size format.
    ///
    /// `image_width` and `image_height` must be positive.
    pub fn to_normalized(&self, image_width: u32, image_height: u32) -> NormalizedBox {
        debug_assert!(
            image_width > 0 && image_height > 0,
            "normalizing against a zero-sized image"
        );
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let width = f64::from(self.width);
        let height = f64::from(self.height);

        NormalizedBox {
            x_center: (f64::from(self.left) + width / 2.0) / w,
            y_center: (f64::from(self.top) + height / 2.0) / h,
            width: width / w,
            height: height / h,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}x{}]",
            self.left, self.top, self.width, self.height
        )
    }
}

/// Box geometry as fractions of the image size, center-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    /// Convert back to pixel space.
    ///
    /// Pixel values are truncated toward zero, not rounded, so a round trip
    /// through [`Rect::to_normalized`] is exact only to within one pixel per
    /// coordinate.
    pub fn to_rect(&self, image_width: u32, image_height: u32) -> Rect {
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let width = self.width * w;
        let height = self.height * h;
        let left = self.x_center * w - width / 2.0;
        let top = self.y_center * h - height / 2.0;

        Rect::new(left as i32, top as i32, width as i32, height as i32)
    }
}

/// Integer surrogate key for a label name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A labeled rectangle on one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundingBox {
    /// Geometry in image-pixel coordinates.
    pub rect: Rect,
    /// Display name of the category. Empty until labeled, or when the class
    /// id no longer maps to a registered label.
    pub label: String,
    /// `None` when the box has no class in the registry.
    pub class_id: Option<ClassId>,
    /// Transient UI flag, never persisted.
    pub selected: bool,
}

impl BoundingBox {
    pub fn new(rect: Rect, label: impl Into<String>, class_id: Option<ClassId>) -> Self {
        Self {
            rect,
            label: label.into(),
            class_id,
            selected: false,
        }
    }

    pub fn contains(&self, point: Pixel) -> bool {
        self.rect.contains(point)
    }

    pub fn nearest_corner(&self, point: Pixel, threshold: f64) -> Option<Corner> {
        self.rect.nearest_corner(point, threshold)
    }

    pub fn to_normalized(&self, image_width: u32, image_height: u32) -> NormalizedBox {
        self.rect.to_normalized(image_width, image_height)
    }

    /// Rebuild a box from its normalized representation. See
    /// [`NormalizedBox::to_rect`] for the truncation this implies.
    pub fn from_normalized(
        normalized: &NormalizedBox,
        image_width: u32,
        image_height: u32,
        label: impl Into<String>,
        class_id: Option<ClassId>,
    ) -> Self {
        Self::new(
            normalized.to_rect(image_width, image_height),
            label,
            class_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_normalized_matches_reference_values() {
        let rect = Rect::new(100, 50, 200, 100);
        let n = rect.to_normalized(800, 600);

        assert!((n.x_center - 0.25).abs() < 1e-6);
        assert!((n.y_center - 0.166_667).abs() < 1e-6);
        assert!((n.width - 0.25).abs() < 1e-6);
        assert!((n.height - 0.166_667).abs() < 1e-6);
    }

    #[test]
    fn test_from_normalized_truncates() {
        // 0.5 * 11 - 3.3 / 2 = 3.85 -> 3, width 3.3 -> 3
        let n = NormalizedBox {
            x_center: 0.5,
            y_center: 0.5,
            width: 0.3,
            height: 0.3,
        };
        let rect = n.to_rect(11, 11);
        assert_eq!(rect, Rect::new(3, 3, 3, 3));
    }

    #[test]
    fn test_from_points_normalizes_drag_direction() {
        let rect = Rect::from_points(Pixel::new(50, 40), Pixel::new(10, 20));
        assert_eq!(rect, Rect::new(10, 20, 40, 20));
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(10, 10, 20, 20);
        assert!(rect.contains(Pixel::new(10, 10)));
        assert!(rect.contains(Pixel::new(29, 29)));
        assert!(!rect.contains(Pixel::new(30, 15)));
        assert!(!rect.contains(Pixel::new(15, 30)));
        assert!(!rect.contains(Pixel::new(9, 15)));
    }

    #[test]
    fn test_nearest_corner_threshold_is_inclusive() {
        let rect = Rect::new(100, 100, 50, 50);

        assert_eq!(
            rect.nearest_corner(Pixel::new(90, 100), CORNER_THRESHOLD),
            Some(Corner::TopLeft)
        );
        assert_eq!(
            rect.nearest_corner(Pixel::new(89, 100), CORNER_THRESHOLD),
            None
        );
        assert_eq!(
            rect.nearest_corner(Pixel::new(125, 125), CORNER_THRESHOLD),
            None
        );
        assert_eq!(
            rect.nearest_corner(Pixel::new(152, 148), CORNER_THRESHOLD),
            Some(Corner::BottomRight)
        );
    }

    #[test]
    fn test_nearest_corner_prefers_earlier_corner() {
        // Tiny box: every corner is within reach, top-left wins.
        let rect = Rect::new(0, 0, 4, 4);
        assert_eq!(
            rect.nearest_corner(Pixel::new(4, 4), CORNER_THRESHOLD),
            Some(Corner::TopLeft)
        );
        assert_eq!(
            rect.nearest_corner(Pixel::new(4, 0), 4.0),
            Some(Corner::TopLeft)
        );
        assert_eq!(
            rect.nearest_corner(Pixel::new(5, 0), 4.0),
            Some(Corner::TopRight)
        );
    }

    #[test]
    fn test_with_corner_swaps_edges_when_crossing() {
        let rect = Rect::new(10, 10, 20, 20);

        let dragged = rect.with_corner(Corner::TopLeft, Pixel::new(40, 50));
        assert_eq!(dragged, Rect::new(30, 30, 10, 20));
        assert!(dragged.width >= 0 && dragged.height >= 0);

        let grown = rect.with_corner(Corner::BottomRight, Pixel::new(60, 45));
        assert_eq!(grown, Rect::new(10, 10, 50, 35));

        let flipped = rect.with_corner(Corner::TopRight, Pixel::new(0, 40));
        assert_eq!(flipped, Rect::new(0, 30, 10, 10));
    }

    proptest! {
        #[test]
        fn normalized_roundtrip_is_within_one_pixel(
            image_w in 1u32..4000,
            image_h in 1u32..4000,
            left in 0i32..2000,
            top in 0i32..2000,
            width in 1i32..2000,
            height in 1i32..2000,
        ) {
            let rect = Rect::new(left, top, width, height);
            let restored = rect.to_normalized(image_w, image_h).to_rect(image_w, image_h);

            prop_assert!((restored.left - rect.left).abs() <= 1);
            prop_assert!((restored.top - rect.top).abs() <= 1);
            prop_assert!((restored.width - rect.width).abs() <= 1);
            prop_assert!((restored.height - rect.height).abs() <= 1);
        }
    }
}
