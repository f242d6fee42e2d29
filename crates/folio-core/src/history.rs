//! Linear undo/redo over full document snapshots.

use crate::document::ResumeConfig;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of undo states to keep.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A snapshot of the document taken before an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Deep copy of the document.
    pub document: ResumeConfig,
    /// Label of the action that followed the snapshot.
    pub action: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(document: &ResumeConfig, action: impl Into<String>) -> Self {
        Self {
            document: document.clone(),
            action: action.into(),
            timestamp: now_millis(),
        }
    }
}

/// Past and future stacks of document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// Oldest first.
    past: Vec<HistoryEntry>,
    /// Next redo last.
    future: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit,
        }
    }

    /// Resume from a persisted undo stack (oldest first). Entries beyond
    /// `limit` are evicted from the front.
    pub fn with_past(past: Vec<HistoryEntry>, limit: usize) -> Self {
        let mut history = Self {
            past,
            future: Vec::new(),
            limit,
        };
        history.trim();
        history
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the capacity, evicting the oldest entries if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    fn trim(&mut self) {
        if self.past.len() > self.limit {
            let excess = self.past.len() - self.limit;
            self.past.drain(..excess);
        }
    }

    /// Snapshot `current` before a mutation (call before making changes).
    pub fn record(&mut self, current: &ResumeConfig, action: impl Into<String>) {
        self.past.push(HistoryEntry::new(current, action));
        self.future.clear();
        self.trim();
    }

    /// Step back. Returns the document to make current, or None if there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &ResumeConfig) -> Option<ResumeConfig> {
        let entry = self.past.pop()?;
        self.future.push(HistoryEntry::new(current, "Undo"));
        Some(entry.document)
    }

    /// Step forward. Returns the document to make current, or None if there
    /// is nothing to redo.
    pub fn redo(&mut self, current: &ResumeConfig) -> Option<ResumeConfig> {
        let entry = self.future.pop()?;
        self.past.push(HistoryEntry::new(current, "Redo"));
        self.trim();
        Some(entry.document)
    }

    /// Jump to an arbitrary snapshot. Recorded like any other action, so the
    /// jump itself can be undone.
    pub fn restore(&mut self, current: &ResumeConfig, entry: &HistoryEntry) -> ResumeConfig {
        self.record(current, format!("Restore: {}", entry.action));
        entry.document.clone()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Undo entries, oldest first.
    pub fn past(&self) -> &[HistoryEntry] {
        &self.past
    }

    /// Redo entries, next redo first.
    pub fn future(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.future.iter().rev()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
