// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation persistence in YOLO text format.
//!
//! Output layout:
//!
//! ```text
//! <output_dir>/
//!     classes.txt          one label per line, line number == class id
//!     images/<file name>   copies of annotated source images
//!     labels/<stem>.txt    one "<class> <xc> <yc> <w> <h>" record per box
//! ```

use crate::error::StoreError;
use crate::models::{BoundingBox, ClassId, LabelRegistry, NormalizedBox};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

const IMAGES_DIR: &str = "images";
const LABELS_DIR: &str = "labels";
const CLASSES_FILE: &str = "classes.txt";
const LABEL_EXTENSION: &str = "txt";

/// Class id written for boxes that have no class.
const UNRESOLVED_CLASS: i64 = -1;

/// Result of [`AnnotationStore::copy_image_to_output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    /// A file with the same name was already in `images/`; nothing was written.
    AlreadyPresent,
}

/// Reads and writes per-image annotation files and the shared class list.
///
/// The store owns the session's [`LabelRegistry`]; callers reach it through
/// [`AnnotationStore::labels`] and [`AnnotationStore::labels_mut`].
#[derive(Debug)]
pub struct AnnotationStore {
    output_dir: PathBuf,
    labels: LabelRegistry,
}

impl AnnotationStore {
    pub fn new(output_dir: impl Into<PathBuf>, labels: LabelRegistry) -> Self {
        Self {
            output_dir: output_dir.into(),
            labels,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(&mut self, output_dir: impl Into<PathBuf>) {
        self.output_dir = output_dir.into();
    }

    pub fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LabelRegistry {
        &mut self.labels
    }

    /// Create `images/` and `labels/` under the output directory.
    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        for dir in [self.images_dir(), self.labels_dir()] {
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join(IMAGES_DIR)
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.output_dir.join(LABELS_DIR)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.output_dir.join(CLASSES_FILE)
    }

    /// Annotation file for an image: `labels/<image stem>.txt`.
    pub fn annotation_path(&self, image_path: &Path) -> PathBuf {
        let mut file_name = image_path
            .file_stem()
            .unwrap_or(image_path.as_os_str())
            .to_os_string();
        file_name.push(".");
        file_name.push(LABEL_EXTENSION);
        self.labels_dir().join(file_name)
    }

    /// Write one record per box, in list order, then rewrite `classes.txt`.
    ///
    /// A failure mid-write leaves whatever was already written in place.
    pub fn save_annotations(
        &self,
        image_path: &Path,
        boxes: &[BoundingBox],
        image_width: u32,
        image_height: u32,
    ) -> Result<(), StoreError> {
        self.ensure_layout()?;

        let path = self.annotation_path(image_path);
        let file = fs::File::create(&path).map_err(|e| StoreError::io(&path, e))?;
        let mut out = BufWriter::new(file);

        for bbox in boxes {
            let n = bbox.to_normalized(image_width, image_height);
            let class = bbox
                .class_id
                .map_or(UNRESOLVED_CLASS, |id| i64::from(id.0));
            writeln!(
                out,
                "{} {:.6} {:.6} {:.6} {:.6}",
                class, n.x_center, n.y_center, n.width, n.height
            )
            .map_err(|e| StoreError::io(&path, e))?;
        }
        out.flush().map_err(|e| StoreError::io(&path, e))?;

        log::info!(
            "Saved {} annotation(s) for {} to {}",
            boxes.len(),
            image_path.display(),
            path.display()
        );

        self.save_classes_file()
    }

    /// Read the boxes stored for `image_path`.
    ///
    /// A missing annotation file yields an empty list. Lines that do not
    /// parse as `<int> <float> <float> <float> <float>` are skipped.
    pub fn load_annotations(
        &self,
        image_path: &Path,
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<BoundingBox>, StoreError> {
        let path = self.annotation_path(image_path);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        let mut boxes = Vec::new();
        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((class_id, normalized)) = parse_record(line) else {
                log::warn!(
                    "Skipping invalid annotation line {} in {}: {:?}",
                    line_idx + 1,
                    path.display(),
                    line
                );
                continue;
            };

            let label = class_id.map_or("", |id| self.labels.label_of(id));
            boxes.push(BoundingBox::from_normalized(
                &normalized,
                image_width,
                image_height,
                label,
                class_id,
            ));
        }

        log::info!(
            "Loaded {} annotation(s) for {}",
            boxes.len(),
            image_path.display()
        );
        Ok(boxes)
    }

    pub fn has_annotations(&self, image_path: &Path) -> bool {
        self.annotation_path(image_path).exists()
    }

    /// Copy the source image into `images/`, unless a file of the same name
    /// is already there. Existing files are never compared or overwritten.
    pub fn copy_image_to_output(&self, image_path: &Path) -> Result<CopyOutcome, StoreError> {
        let file_name = image_path.file_name().ok_or_else(|| {
            StoreError::io(
                image_path,
                std::io::Error::new(ErrorKind::InvalidInput, "image path has no file name"),
            )
        })?;
        let dest = self.images_dir().join(file_name);

        if dest.exists() {
            log::debug!("{} already in output, not copying", dest.display());
            return Ok(CopyOutcome::AlreadyPresent);
        }

        self.ensure_layout()?;
        fs::copy(image_path, &dest).map_err(|e| StoreError::io(&dest, e))?;
        log::info!("Copied {} to {}", image_path.display(), dest.display());
        Ok(CopyOutcome::Copied)
    }

    /// Rewrite `classes.txt` from the registry.
    ///
    /// Line `n` holds the label of class `n`. Retired ids are written as
    /// blank lines so surviving labels keep their ids on reload.
    pub fn save_classes_file(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.output_dir).map_err(|e| StoreError::io(&self.output_dir, e))?;

        let path = self.classes_path();
        let file = fs::File::create(&path).map_err(|e| StoreError::io(&path, e))?;
        let mut out = BufWriter::new(file);

        for id in 0..self.labels.next_id().0 {
            writeln!(out, "{}", self.labels.label_of(ClassId(id)))
                .map_err(|e| StoreError::io(&path, e))?;
        }
        out.flush().map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }

    /// Replace the registry with the contents of `classes.txt`.
    ///
    /// Returns `Ok(false)`, leaving the registry untouched, when the file does
    /// not exist. A blank line keeps its id reserved without a label; a label
    /// repeated on a later line keeps its first id.
    pub fn load_classes_file(&mut self) -> Result<bool, StoreError> {
        let path = self.classes_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        self.labels.clear();
        for line in content.lines() {
            let name = line.trim();
            if name.is_empty() || self.labels.contains(name) {
                self.labels.reserve_id();
            } else {
                self.labels.add_label(name);
            }
        }

        log::info!(
            "Loaded {} class(es) from {}",
            self.labels.len(),
            path.display()
        );
        Ok(true)
    }

    /// Prepare the output layout, read `classes.txt` if present, then
    /// register `seed` labels on top. Seed labels already in the class list
    /// keep their ids; new ones are appended.
    pub fn restore<S: AsRef<str>>(&mut self, seed: &[S]) -> Result<bool, StoreError> {
        self.ensure_layout()?;
        let loaded = self.load_classes_file()?;
        for name in seed {
            self.labels.add_label(name.as_ref());
        }
        Ok(loaded)
    }
}

/// Parse one `<class> <xc> <yc> <w> <h>` record. A negative class id means
/// the box is unresolved.
fn parse_record(line: &str) -> Option<(Option<ClassId>, NormalizedBox)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [class, xc, yc, w, h] = parts.as_slice() else {
        return None;
    };

    let class: i64 = class.parse().ok()?;
    let class_id = u32::try_from(class).ok().map(ClassId);

    Some((
        class_id,
        NormalizedBox {
            x_center: xc.parse().ok()?,
            y_center: yc.parse().ok()?,
            width: w.parse().ok()?,
            height: h.parse().ok()?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rect;

    fn store_with_labels(dir: &Path, names: &[&str]) -> AnnotationStore {
        let mut labels = LabelRegistry::new();
        for name in names {
            labels.add_label(name);
        }
        AnnotationStore::new(dir, labels)
    }

    #[test]
    fn test_save_writes_six_decimal_records_in_order() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &["car", "person"]);
        let boxes = vec![
            BoundingBox::new(Rect::new(100, 50, 200, 100), "person", Some(ClassId(1))),
            BoundingBox::new(Rect::new(0, 0, 400, 300), "car", Some(ClassId(0))),
        ];

        store
            .save_annotations(Path::new("/photos/foo.jpg"), &boxes, 800, 600)
            .expect("save annotations");

        let written =
            fs::read_to_string(temp.path().join("labels/foo.txt")).expect("read label file");
        assert_eq!(
            written,
            "1 0.250000 0.166667 0.250000 0.166667\n0 0.250000 0.250000 0.500000 0.500000\n"
        );

        let classes = fs::read_to_string(temp.path().join("classes.txt")).expect("read classes");
        assert_eq!(classes, "car\nperson\n");

        assert!(store.has_annotations(Path::new("/photos/foo.jpg")));
        assert!(store.has_annotations(Path::new("elsewhere/foo.png")));
        assert!(!store.has_annotations(Path::new("/photos/bar.jpg")));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &[]);

        let boxes = store
            .load_annotations(Path::new("never_saved.png"), 640, 480)
            .expect("load annotations");
        assert!(boxes.is_empty());
        assert!(!store.has_annotations(Path::new("never_saved.png")));
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &["car"]);
        store.ensure_layout().expect("create layout");
        fs::write(
            temp.path().join("labels/img.txt"),
            "0 0.5 0.5 0.5 0.5\n\
             not a record\n\
             0 0.5 0.5 0.5\n\
             x 0.5 0.5 0.5 0.5\n\
             0 0.5 abc 0.5 0.5\n\
             \n\
             0    0.25   0.25   0.5 0.5   \n",
        )
        .expect("write label file");

        let boxes = store
            .load_annotations(Path::new("img.jpg"), 100, 100)
            .expect("load annotations");
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].rect, Rect::new(25, 25, 50, 50));
        assert_eq!(boxes[1].rect, Rect::new(0, 0, 50, 50));
        assert!(boxes.iter().all(|b| b.label == "car"));
    }

    #[test]
    fn test_unknown_class_id_loads_with_empty_label() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &["car"]);
        store.ensure_layout().expect("create layout");
        fs::write(
            temp.path().join("labels/img.txt"),
            "7 0.5 0.5 0.2 0.2\n-1 0.5 0.5 0.2 0.2\n",
        )
        .expect("write label file");

        let boxes = store
            .load_annotations(Path::new("img.png"), 100, 100)
            .expect("load annotations");
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].class_id, Some(ClassId(7)));
        assert_eq!(boxes[0].label, "");
        assert_eq!(boxes[1].class_id, None);
        assert_eq!(boxes[1].label, "");
    }

    #[test]
    fn test_unresolved_box_is_written_as_negative_one() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &[]);
        let boxes = vec![BoundingBox::new(Rect::new(0, 0, 10, 10), "", None)];

        store
            .save_annotations(Path::new("a.png"), &boxes, 10, 10)
            .expect("save annotations");
        let written = fs::read_to_string(temp.path().join("labels/a.txt")).expect("read");
        assert_eq!(written, "-1 0.500000 0.500000 1.000000 1.000000\n");
    }

    #[test]
    fn test_save_fails_when_destination_is_not_writable() {
        let temp = tempfile::tempdir().expect("create temp dir");
        // A regular file where the output directory should be.
        let blocker = temp.path().join("out");
        fs::write(&blocker, "not a directory").expect("write blocker");
        let store = store_with_labels(&blocker, &["car"]);

        let result = store.save_annotations(
            Path::new("foo.jpg"),
            &[BoundingBox::new(Rect::new(0, 0, 10, 10), "car", Some(ClassId(0)))],
            100,
            100,
        );
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_classes_file_keeps_gaps_for_retired_ids() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut store = store_with_labels(temp.path(), &["a", "b", "c"]);
        store.labels_mut().remove_label("b");
        store.save_classes_file().expect("save classes");

        let classes = fs::read_to_string(temp.path().join("classes.txt")).expect("read classes");
        assert_eq!(classes, "a\n\nc\n");

        let mut reloaded = AnnotationStore::new(temp.path(), LabelRegistry::new());
        assert!(reloaded.load_classes_file().expect("load classes"));
        assert_eq!(reloaded.labels().class_id_of("a"), Some(ClassId(0)));
        assert_eq!(reloaded.labels().class_id_of("c"), Some(ClassId(2)));
        assert_eq!(reloaded.labels().label_of(ClassId(1)), "");
        assert_eq!(reloaded.labels().next_id(), ClassId(3));
    }

    #[test]
    fn test_load_classes_replaces_registry() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("classes.txt"), "dog\ncat\n").expect("write classes");
        let mut store = store_with_labels(temp.path(), &["stale"]);

        assert!(store.load_classes_file().expect("load classes"));
        assert!(!store.labels().contains("stale"));
        assert_eq!(store.labels().class_id_of("dog"), Some(ClassId(0)));
        assert_eq!(store.labels().class_id_of("cat"), Some(ClassId(1)));
    }

    #[test]
    fn test_restore_keeps_seed_labels_after_class_list() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::write(temp.path().join("classes.txt"), "car\n\nperson\n").expect("write classes");
        let mut store = store_with_labels(temp.path(), &[]);

        assert!(store.restore(&["person", "bike"]).expect("restore"));
        assert_eq!(store.labels().class_id_of("car"), Some(ClassId(0)));
        assert_eq!(store.labels().class_id_of("person"), Some(ClassId(2)));
        assert_eq!(store.labels().class_id_of("bike"), Some(ClassId(3)));
        assert!(temp.path().join("images").is_dir());
        assert!(temp.path().join("labels").is_dir());

        let mut fresh = store_with_labels(&temp.path().join("new"), &[]);
        assert!(!fresh.restore(&["bike".to_string()]).expect("restore fresh"));
        assert_eq!(fresh.labels().class_id_of("bike"), Some(ClassId(0)));
    }

    #[test]
    fn test_load_classes_without_file_keeps_registry() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut store = store_with_labels(temp.path(), &["car"]);

        assert!(!store.load_classes_file().expect("load classes"));
        assert!(store.labels().contains("car"));
    }

    #[test]
    fn test_copy_image_skips_existing_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let source_dir = temp.path().join("src");
        fs::create_dir_all(&source_dir).expect("create source dir");
        let image = source_dir.join("shot.png");
        fs::write(&image, b"first").expect("write image");

        let store = store_with_labels(&temp.path().join("out"), &[]);
        assert_eq!(
            store.copy_image_to_output(&image).expect("copy"),
            CopyOutcome::Copied
        );

        fs::write(&image, b"second").expect("rewrite image");
        assert_eq!(
            store.copy_image_to_output(&image).expect("copy again"),
            CopyOutcome::AlreadyPresent
        );

        let copied = fs::read(temp.path().join("out/images/shot.png")).expect("read copy");
        assert_eq!(copied, b"first");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = store_with_labels(temp.path(), &[]);

        let result = store.copy_image_to_output(&temp.path().join("missing.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn test_annotation_path_uses_file_stem() {
        let store = store_with_labels(Path::new("out"), &[]);
        assert_eq!(
            store.annotation_path(Path::new("/data/set/frame_01.jpeg")),
            Path::new("out/labels/frame_01.txt")
        );
        assert_eq!(
            store.annotation_path(Path::new("scan.v2.png")),
            Path::new("out/labels/scan.v2.txt")
        );
    }
}
