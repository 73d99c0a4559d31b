// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Integration tests driving the canvas engine and dataset stores together.

use std::fs;

use boxlab::io::{AnnotationStore, CategoryStore};
use boxlab::models::{BoundingBox, LabelRegistry, Rect};
use boxlab::ui::{CanvasEvent, CanvasInput, CanvasSettings, ImageCanvas};
use boxlab::util::geometry::Point;

const IMAGE_WIDTH: u32 = 400;
const IMAGE_HEIGHT: u32 = 300;

/// Canvas showing a 400x300 image at scale 1.0 with its origin at (10, 10).
fn canvas_with_image() -> ImageCanvas {
    let mut canvas = ImageCanvas::new(CanvasSettings::default());
    canvas.handle(CanvasInput::ViewportResize {
        width: 420.0,
        height: 320.0,
    });
    canvas.handle(CanvasInput::ImageLoaded {
        width: IMAGE_WIDTH,
        height: IMAGE_HEIGHT,
    });
    canvas
}

/// Image-space point on the canvas above.
fn at(x: f64, y: f64) -> Point {
    Point::new(x + 10.0, y + 10.0)
}

fn drag(canvas: &mut ImageCanvas, from: Point, to: Point) -> Option<CanvasEvent> {
    canvas.handle(CanvasInput::PointerDown(from));
    canvas.handle(CanvasInput::PointerMove(to));
    canvas.handle(CanvasInput::PointerUp(to))
}

fn registry(names: &[&str]) -> LabelRegistry {
    let mut labels = LabelRegistry::new();
    for name in names {
        labels.add_label(name);
    }
    labels
}

#[test]
fn normalizes_reference_box() {
    let bbox = BoundingBox::new(Rect::new(100, 50, 200, 100), "car", None);
    let n = bbox.to_normalized(800, 600);

    assert!((n.x_center - 0.25).abs() < 1e-6);
    assert!((n.y_center - 0.166667).abs() < 1e-6);
    assert!((n.width - 0.25).abs() < 1e-6);
    assert!((n.height - 0.166667).abs() < 1e-6);
}

#[test]
fn small_drag_creates_nothing() {
    let mut canvas = canvas_with_image();

    let event = drag(&mut canvas, at(10.0, 10.0), at(15.0, 12.0));

    assert_eq!(event, None);
    assert!(canvas.boxes().is_empty());
}

#[test]
fn drawn_boxes_survive_save_and_load() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image_path = temp.path().join("foo.jpg");
    fs::write(&image_path, b"not decoded by the store").expect("write image");

    let output_dir = temp.path().join("out");
    let store = AnnotationStore::new(&output_dir, registry(&["car", "person"]));
    let mut canvas = canvas_with_image();

    for (from, to, label) in [
        (at(20.0, 30.0), at(120.0, 90.0), "car"),
        (at(200.0, 100.0), at(260.0, 250.0), "person"),
    ] {
        let Some(CanvasEvent::BoxCreated(rect)) = drag(&mut canvas, from, to) else {
            panic!("drag should create a box");
        };
        let class_id = store.labels().class_id_of(label);
        canvas.add_box(BoundingBox::new(rect, label, class_id));
    }

    store
        .save_annotations(&image_path, canvas.boxes(), IMAGE_WIDTH, IMAGE_HEIGHT)
        .expect("save annotations");
    store.copy_image_to_output(&image_path).expect("copy image");

    assert!(output_dir.join("labels/foo.txt").is_file());
    assert!(output_dir.join("images/foo.jpg").is_file());
    assert_eq!(
        fs::read_to_string(output_dir.join("classes.txt")).expect("read classes"),
        "car\nperson\n"
    );

    // A fresh session restores the class list first, then the boxes.
    let mut reloaded = AnnotationStore::new(&output_dir, LabelRegistry::new());
    assert!(reloaded.load_classes_file().expect("load classes"));
    let boxes = reloaded
        .load_annotations(&image_path, IMAGE_WIDTH, IMAGE_HEIGHT)
        .expect("load annotations");

    let mut fresh = canvas_with_image();
    fresh.set_boxes(boxes);

    assert_eq!(fresh.boxes().len(), 2);
    for (original, loaded) in canvas.boxes().iter().zip(fresh.boxes()) {
        assert!((original.rect.left - loaded.rect.left).abs() <= 1);
        assert!((original.rect.top - loaded.rect.top).abs() <= 1);
        assert!((original.rect.width - loaded.rect.width).abs() <= 1);
        assert!((original.rect.height - loaded.rect.height).abs() <= 1);
        assert_eq!(original.label, loaded.label);
        assert_eq!(original.class_id, loaded.class_id);
    }
}

#[test]
fn removing_box_before_selection_tracks_same_box() {
    let mut canvas = canvas_with_image();
    canvas.add_box(BoundingBox::new(Rect::new(0, 0, 50, 50), "a", None));
    canvas.add_box(BoundingBox::new(Rect::new(100, 0, 50, 50), "b", None));
    canvas.add_box(BoundingBox::new(Rect::new(200, 0, 50, 50), "c", None));
    canvas.set_selected(Some(2));

    let removed = canvas.remove_box(1).expect("box 1 exists");

    assert_eq!(removed.label, "b");
    assert_eq!(canvas.boxes().len(), 2);
    assert_eq!(canvas.selected_index(), Some(1));
    assert_eq!(canvas.boxes()[1].label, "c");
    assert!(canvas.boxes()[1].selected);
}

#[test]
fn removed_label_leaves_gap_in_class_list() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let mut store = AnnotationStore::new(temp.path(), registry(&["car", "person", "bike"]));
    store.labels_mut().remove_label("person");
    store.save_classes_file().expect("save classes");

    let mut reloaded = AnnotationStore::new(temp.path(), LabelRegistry::new());
    reloaded.load_classes_file().expect("load classes");

    let bike = reloaded.labels().class_id_of("bike").expect("bike restored");
    assert_eq!(bike.0, 2);
    assert!(!reloaded.labels().contains("person"));
    assert_eq!(reloaded.labels_mut().add_label("truck").0, 3);
}

#[test]
fn classified_images_fill_category_folders_without_overwriting() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let night_one = temp.path().join("night1");
    let night_two = temp.path().join("night2");
    fs::create_dir_all(&night_one).expect("create night1");
    fs::create_dir_all(&night_two).expect("create night2");
    let first = night_one.join("m42.jpg");
    let second = night_two.join("m42.jpg");
    fs::write(&first, b"orion, night one").expect("write first");
    fs::write(&second, b"orion, night two").expect("write second");

    let output_dir = temp.path().join("classified");
    let mut store = CategoryStore::new(&output_dir);
    assert!(store.add_category("nebula").expect("add nebula"));

    let a = store.classify_image(&first, "nebula").expect("classify first");
    let b = store.classify_image(&second, "nebula").expect("classify second");

    assert_eq!(a, output_dir.join("nebula/m42.jpg"));
    assert_ne!(a, b);
    assert_eq!(b.parent(), Some(output_dir.join("nebula").as_path()));
    let renamed = b.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
    assert!(renamed.starts_with("m42_") && renamed.ends_with(".jpg"), "{renamed}");
    assert_eq!(fs::read(&a).expect("read a"), b"orion, night one");
    assert_eq!(fs::read(&b).expect("read b"), b"orion, night two");

    // A later session finds the category folder again.
    let mut reopened = CategoryStore::new(&output_dir);
    assert_eq!(reopened.scan_categories().expect("scan"), 1);
    assert!(reopened.contains("nebula"));
}
