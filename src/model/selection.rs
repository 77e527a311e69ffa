//! Row selection keyed by stable row identity
//!
//! Selection survives re-sorting and filtering: a row stays selected for as
//! long as its key is in the set, wherever it ends up in the pipeline output.

use std::collections::HashSet;

use super::row::{RowKey, RowRef};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: HashSet<RowKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: RowKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn select(&mut self, key: RowKey) {
        self.keys.insert(key);
    }

    pub fn deselect(&mut self, key: RowKey) {
        self.keys.remove(&key);
    }

    /// Flip membership; returns true when the key is now selected
    pub fn toggle(&mut self, key: RowKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn select_all(&mut self, rows: &[RowRef]) {
        self.keys.extend(rows.iter().map(|r| r.key()));
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when every row in `rows` is selected (and `rows` is non-empty)
    pub fn all_selected(&self, rows: &[RowRef]) -> bool {
        !rows.is_empty() && rows.iter().all(|r| self.contains(r.key()))
    }

    pub fn keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.keys.iter().copied()
    }
}
