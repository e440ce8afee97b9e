//! Selection register for batch actions.
//!
//! Selection is independent of the lifecycle: any tracked file can be
//! selected regardless of its status.

use std::collections::HashSet;

use crate::file::FileId;

/// The set of selected file ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<FileId>,
}

impl Selection {
    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: FileId) -> bool {
        self.ids.contains(&id)
    }

    /// Flip the selection of `id`; returns the new state.
    pub fn toggle(&mut self, id: FileId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select `id`.
    pub fn select(&mut self, id: FileId) {
        self.ids.insert(id);
    }

    /// Deselect `id`.
    pub fn deselect(&mut self, id: FileId) {
        self.ids.remove(&id);
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips() {
        let mut selection = Selection::default();
        let id = FileId::new();
        assert!(selection.toggle(id));
        assert!(selection.is_selected(id));
        assert!(!selection.toggle(id));
        assert!(!selection.is_selected(id));
    }

    #[test]
    fn select_is_idempotent() {
        let mut selection = Selection::default();
        let id = FileId::new();
        selection.select(id);
        selection.select(id);
        assert_eq!(selection.len(), 1);
        selection.deselect(id);
        assert!(selection.is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut selection = Selection::default();
        selection.select(FileId::new());
        selection.select(FileId::new());
        selection.clear();
        assert!(selection.is_empty());
    }
}
