// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label registry.
//!
//! Maps label names to class ids and back. Ids are handed out from a
//! counter that only ever grows, so an id is never given to a different
//! label within a session.

use super::bounding_box::ClassId;
use std::collections::BTreeMap;

/// Bidirectional label name <-> class id mapping for one session.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    label_to_id: BTreeMap<String, ClassId>,
    id_to_label: BTreeMap<ClassId, String>,
    next_id: u32,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, returning its class id. Registering an existing
    /// label returns the id it already has.
    pub fn add_label(&mut self, name: &str) -> ClassId {
        if let Some(&id) = self.label_to_id.get(name) {
            return id;
        }

        let id = ClassId(self.next_id);
        self.label_to_id.insert(name.to_string(), id);
        self.id_to_label.insert(id, name.to_string());
        self.next_id += 1;
        log::info!("Registered label '{}' as class {}", name, id);
        id
    }

    /// Remove `name` from both directions. The id is retired, not recycled.
    pub fn remove_label(&mut self, name: &str) -> Option<ClassId> {
        let id = self.label_to_id.remove(name)?;
        self.id_to_label.remove(&id);
        log::info!("Removed label '{}' (class {} retired)", name, id);
        Some(id)
    }

    pub fn class_id_of(&self, name: &str) -> Option<ClassId> {
        self.label_to_id.get(name).copied()
    }

    /// Label for `id`, or an empty string for an id with no label.
    pub fn label_of(&self, id: ClassId) -> &str {
        self.id_to_label.get(&id).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.label_to_id.contains_key(name)
    }

    /// Registered labels in ascending class id order.
    pub fn labels(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.id_to_label.iter().map(|(&id, name)| (id, name.as_str()))
    }

    /// The id the next new label will receive.
    pub fn next_id(&self) -> ClassId {
        ClassId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.label_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label_to_id.is_empty()
    }

    /// Drop every label and restart numbering at 0.
    pub fn clear(&mut self) {
        self.label_to_id.clear();
        self.id_to_label.clear();
        self.next_id = 0;
    }

    /// Burn one id without attaching a label to it. Used when restoring a
    /// class list that had gaps.
    pub(crate) fn reserve_id(&mut self) -> ClassId {
        let id = ClassId(self.next_id);
        self.next_id += 1;
        id
    }
}
