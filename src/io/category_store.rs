// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Classification dataset storage.
//!
//! Each category is a folder directly under the output directory. Classifying
//! an image copies it into its category folder:
//!
//! ```text
//! <output_dir>/
//!     <category>/<file name>
//!     <category>/<stem>_<yyyymmdd_hhmmss>.<ext>   when the name is taken
//! ```

use crate::error::StoreError;
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Format of the suffix that keeps a second copy from replacing the first.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Attempts at a free destination name before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Category folders of a classification dataset.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    output_dir: PathBuf,
    categories: BTreeSet<String>,
}

impl CategoryStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            categories: BTreeSet::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Point at another dataset. Known categories are forgotten.
    pub fn set_output_dir(&mut self, output_dir: impl Into<PathBuf>) {
        self.output_dir = output_dir.into();
        self.categories.clear();
    }

    /// Categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category_dir(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// Register a category and create its folder.
    ///
    /// Returns `Ok(false)` if the category was already known.
    pub fn add_category(&mut self, name: &str) -> Result<bool, StoreError> {
        if !is_valid_category(name) {
            return Err(StoreError::InvalidCategory {
                name: name.to_string(),
            });
        }

        let dir = self.category_dir(name);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let added = self.categories.insert(name.to_string());
        if added {
            log::info!("Added category '{}' at {}", name, dir.display());
        }
        Ok(added)
    }

    /// Register every folder already under the output directory.
    ///
    /// A missing output directory holds no categories. Returns how many
    /// categories were found.
    pub fn scan_categories(&mut self) -> Result<usize, StoreError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StoreError::io(&self.output_dir, e)),
        };

        let mut found = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.output_dir, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str().filter(|n| is_valid_category(n)) {
                self.categories.insert(name.to_string());
                found += 1;
            }
        }
        log::debug!("Found {} category folder(s) in {}", found, self.output_dir.display());
        Ok(found)
    }

    /// Copy `image_path` into the folder of `category` and return where it
    /// landed. An existing file is never replaced: the copy gets a
    /// timestamped name instead.
    pub fn classify_image(&self, image_path: &Path, category: &str) -> Result<PathBuf, StoreError> {
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.classify_image_stamped(image_path, category, &stamp)
    }

    pub(crate) fn classify_image_stamped(
        &self,
        image_path: &Path,
        category: &str,
        stamp: &str,
    ) -> Result<PathBuf, StoreError> {
        if !self.contains(category) {
            return Err(StoreError::UnknownCategory {
                name: category.to_string(),
            });
        }

        let file_name = image_path.file_name().ok_or_else(|| {
            StoreError::io(
                image_path,
                std::io::Error::new(ErrorKind::InvalidInput, "image path has no file name"),
            )
        })?;
        let mut source = fs::File::open(image_path).map_err(|e| StoreError::io(image_path, e))?;

        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let (dest, mut out) = create_unique(&dir, file_name, stamp)?;
        if let Err(e) = std::io::copy(&mut source, &mut out) {
            drop(out);
            if let Err(remove) = fs::remove_file(&dest) {
                log::warn!("Failed to remove partial copy {}: {}", dest.display(), remove);
            }
            return Err(StoreError::io(&dest, e));
        }

        log::info!(
            "Classified {} as '{}' ({})",
            image_path.display(),
            category,
            dest.display()
        );
        Ok(dest)
    }
}

/// A category must be a single, ordinary path component.
fn is_valid_category(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// `<stem>_<stamp>[_<n>].<ext>`, or the plain file name for attempt 0.
fn candidate_name(file_name: &OsStr, stamp: &str, attempt: usize) -> OsString {
    if attempt == 0 {
        return file_name.to_os_string();
    }

    let path = Path::new(file_name);
    let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
    name.push("_");
    name.push(stamp);
    if attempt > 1 {
        name.push(format!("_{}", attempt - 1));
    }
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Create the first free destination file in `dir`.
fn create_unique(
    dir: &Path,
    file_name: &OsStr,
    stamp: &str,
) -> Result<(PathBuf, fs::File), StoreError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let dest = dir.join(candidate_name(file_name, stamp, attempt));
        match fs::OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(file) => return Ok((dest, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, trying another name", dest.display());
            }
            Err(e) => return Err(StoreError::io(&dest, e)),
        }
    }

    Err(StoreError::io(
        dir.join(file_name),
        std::io::Error::new(ErrorKind::AlreadyExists, "no free file name left"),
    ))
}
