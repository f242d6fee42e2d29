//! Measured section heights.
//!
//! Heights are reported by the render layer after it lays out each section.
//! They arrive asynchronously and may refer to sections that no longer exist;
//! the registry accepts them regardless and pagination ignores what it
//! cannot place.

use crate::section::{Section, SectionId};
use std::collections::HashMap;

/// Cache of observed section heights in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeightRegistry {
    heights: HashMap<SectionId, f64>,
}

impl HeightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measured height.
    ///
    /// Returns true if the stored value changed, i.e. pagination needs to be
    /// re-run. Negative and non-finite measurements are ignored.
    pub fn set_height(&mut self, id: impl Into<SectionId>, height: f64) -> bool {
        let id = id.into();
        if !height.is_finite() || height < 0.0 {
            log::debug!("Ignoring invalid height {} for section {}", height, id);
            return false;
        }
        if self.heights.get(&id) == Some(&height) {
            return false;
        }
        self.heights.insert(id, height);
        true
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.heights.get(id).copied()
    }

    pub fn remove(&mut self, id: &str) -> Option<f64> {
        self.heights.remove(id)
    }

    /// Forget heights of sections that are no longer in `sections`.
    /// Returns the number of entries dropped.
    pub fn prune(&mut self, sections: &HashMap<SectionId, Section>) -> usize {
        let before = self.heights.len();
        self.heights.retain(|id, _| sections.contains_key(id));
        before - self.heights.len()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// The raw height map consumed by [`crate::pagination::paginate`].
    pub fn as_map(&self) -> &HashMap<SectionId, f64> {
        &self.heights
    }
}

impl FromIterator<(SectionId, f64)> for HeightRegistry {
    fn from_iter<I: IntoIterator<Item = (SectionId, f64)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (id, height) in iter {
            registry.set_height(id, height);
        }
        registry
    }
}
