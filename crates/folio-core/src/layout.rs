//! Column layout of a resume and the reflow applied when the column count
//! changes.
//!
//! The layout is the single source of truth for which section appears in
//! which column and in what order. Pages are derived from it; see
//! [`crate::pagination`].

use crate::section::{Section, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Largest supported column count.
pub const MAX_COLUMNS: usize = 2;

/// Clamp a requested column count into the supported range.
pub fn clamp_columns(count: usize) -> usize {
    count.clamp(1, MAX_COLUMNS)
}

/// Ordered section ids per column.
///
/// Every id appears in exactly one column, once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub columns: Vec<Vec<SectionId>>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            columns: vec![Vec::new()],
        }
    }
}

impl Layout {
    pub fn new(columns: Vec<Vec<SectionId>>) -> Self {
        Self { columns }
    }

    /// A layout with a single column.
    pub fn single(ids: Vec<SectionId>) -> Self {
        Self { columns: vec![ids] }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.columns.iter().any(|column| column.iter().any(|s| s == id))
    }

    /// All ids, column by column.
    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.columns.iter().flatten()
    }

    pub fn flattened(&self) -> Vec<SectionId> {
        self.ids().cloned().collect()
    }

    /// Append an id to the end of a column, creating missing columns.
    pub fn append(&mut self, column: usize, id: SectionId) {
        while self.columns.len() <= column {
            self.columns.push(Vec::new());
        }
        self.columns[column].push(id);
    }

    /// Remove an id from every column.
    /// Returns true if it was present anywhere.
    pub fn remove(&mut self, id: &str) -> bool {
        let mut removed = false;
        for column in &mut self.columns {
            let before = column.len();
            column.retain(|s| s != id);
            removed |= column.len() != before;
        }
        removed
    }

    /// Move a section to `target_index` of `target` column.
    ///
    /// The id is filtered out rather than spliced by index, so stale source
    /// indices are harmless. The insertion index is clamped to the column
    /// length. Returns false if either column index is out of range.
    pub fn move_section(
        &mut self,
        source: usize,
        target: usize,
        id: &str,
        target_index: usize,
    ) -> bool {
        if source >= self.columns.len() || target >= self.columns.len() {
            return false;
        }
        self.remove(id);
        let column = &mut self.columns[target];
        let index = target_index.min(column.len());
        column.insert(index, id.to_string());
        true
    }

    /// Keep only the ids for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&SectionId) -> bool) {
        for column in &mut self.columns {
            column.retain(|id| keep(id));
        }
    }

    /// Drop repeated ids, keeping the first occurrence in column order.
    /// Returns the number of ids removed.
    pub fn dedup(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut removed = 0;
        for column in &mut self.columns {
            column.retain(|id| {
                let fresh = seen.insert(id.clone());
                if !fresh {
                    removed += 1;
                }
                fresh
            });
        }
        removed
    }

    /// Collapse all columns into one, preserving column-then-row order.
    pub fn flatten(&mut self) {
        self.columns = vec![self.flattened()];
    }

    /// Make the layout have exactly `count` columns. Extra columns are folded
    /// into the last kept column; missing columns are added empty.
    pub fn conform_to(&mut self, count: usize) {
        let count = clamp_columns(count);
        if self.columns.len() > count {
            let overflow: Vec<SectionId> = self.columns.drain(count..).flatten().collect();
            if let Some(last) = self.columns.last_mut() {
                last.extend(overflow);
            }
        }
        while self.columns.len() < count {
            self.columns.push(Vec::new());
        }
    }
}

/// Split ids into a sidebar column (header, skills, languages, custom) and a
/// main column. Ids without a section are dropped.
pub fn split_by_type<'a>(
    ids: impl IntoIterator<Item = &'a SectionId>,
    sections: &HashMap<SectionId, Section>,
) -> Layout {
    let mut sidebar = Vec::new();
    let mut main = Vec::new();
    for id in ids {
        let Some(section) = sections.get(id) else {
            continue;
        };
        if section.kind.is_sidebar() {
            sidebar.push(id.clone());
        } else {
            main.push(id.clone());
        }
    }
    Layout::new(vec![sidebar, main])
}

/// Redistribute a layout for a new column count.
///
/// Collapsing two columns into one caches the two-column arrangement in
/// `cache`. Expanding back restores the cache, dropping ids deleted while
/// collapsed and appending ids added while collapsed to the main column.
/// Without a cache the ids are split by section type.
pub fn reflow(
    layout: &Layout,
    from: usize,
    to: usize,
    sections: &HashMap<SectionId, Section>,
    cache: &mut Option<Layout>,
) -> Layout {
    let mut next = layout.clone();

    if from == 2 && to == 1 {
        *cache = Some(layout.clone());
        next.flatten();
    } else if from == 1 && to == 2 {
        next = match cache.as_ref().filter(|cached| cached.column_count() == 2) {
            Some(cached) => restore(cached, layout),
            None => split_by_type(layout.ids(), sections),
        };
    }

    if to == 1 && next.column_count() != 1 {
        log::warn!(
            "Layout has {} columns after reflow to a single column; flattening",
            next.column_count()
        );
        next.flatten();
    }

    next
}

fn restore(cached: &Layout, current: &Layout) -> Layout {
    let current_ids: Vec<&SectionId> = current.ids().collect();
    let present: HashSet<&SectionId> = current_ids.iter().copied().collect();
    let remembered: HashSet<&SectionId> = cached.ids().collect();

    let mut restored = cached.clone();
    restored.retain(|id| present.contains(id));

    let mut seen = HashSet::new();
    let added: Vec<SectionId> = current_ids
        .into_iter()
        .filter(|id| !remembered.contains(id) && seen.insert(*id))
        .cloned()
        .collect();
    if !added.is_empty() {
        log::debug!("Appending {} section(s) added while collapsed", added.len());
        restored.columns[1].extend(added);
    }
    restored
}

/// Column structures offered by template layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStructure {
    /// Everything in one column.
    Single,
    /// Sidebar column plus main column, split by section type.
    Sidebar,
    /// Flattened into one column.
    Columns,
}

impl LayoutStructure {
    /// Column count the structure produces.
    pub fn column_count(self) -> usize {
        match self {
            LayoutStructure::Sidebar => 2,
            LayoutStructure::Single | LayoutStructure::Columns => 1,
        }
    }
}

/// Rebuild a layout for a template structure. Repeated and dangling ids are
/// dropped.
pub fn apply_structure(
    layout: &Layout,
    structure: LayoutStructure,
    sections: &HashMap<SectionId, Section>,
) -> Layout {
    let mut seen = HashSet::new();
    let unique: Vec<SectionId> = layout
        .ids()
        .filter(|id| sections.contains_key(*id) && seen.insert(*id))
        .cloned()
        .collect();

    match structure {
        LayoutStructure::Sidebar => split_by_type(unique.iter(), sections),
        LayoutStructure::Single | LayoutStructure::Columns => Layout::single(unique),
    }
}
