//! Insertion-ordered map of tracked files keyed by id.

use std::collections::HashMap;

use crate::file::{FileId, FileMeta, TrackedFile};
use crate::status::Status;

/// The authoritative store of tracked files.
///
/// Updates are keyed by [`FileId`], never by position, so asynchronous
/// completions for different files can land in any order. Iteration
/// follows insertion order, which is the order files are rendered in.
#[derive(Debug)]
pub struct FileCollection<F, H> {
    order: Vec<FileId>,
    entries: HashMap<FileId, TrackedFile<F, H>>,
}

impl<F, H> Default for FileCollection<F, H> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

impl<F, H> FileCollection<F, H> {
    /// Number of tracked files, including rejected ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `id` is still tracked.
    #[must_use]
    pub fn contains(&self, id: FileId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Look up a file.
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&TrackedFile<F, H>> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: FileId) -> Option<&mut TrackedFile<F, H>> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, file: TrackedFile<F, H>) {
        let id = file.id();
        if self.entries.insert(id, file).is_none() {
            self.order.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: FileId) -> Option<TrackedFile<F, H>> {
        let removed = self.entries.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    /// Files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedFile<F, H>> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Files currently holding a `max_files` slot.
    #[must_use]
    pub fn admitted_count(&self) -> usize {
        self.entries
            .values()
            .filter(|file| file.status().is_admitted())
            .count()
    }

    /// Files in the given status, in insertion order.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &TrackedFile<F, H>> {
        self.iter().filter(move |file| file.status() == status)
    }

    /// Owned metadata of every file, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FileMeta> {
        self.iter().map(|file| file.meta().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::tests::MemFile;

    fn tracked(name: &str, status: Status) -> TrackedFile<MemFile, ()> {
        TrackedFile::new(MemFile::new(name, 1, "text/plain"), status)
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut files = FileCollection::default();
        let names = ["c", "a", "b"];
        for name in names {
            files.insert(tracked(name, Status::Preparing));
        }
        let seen: Vec<_> = files
            .iter()
            .map(|file| file.meta().name.clone().unwrap_or_default())
            .collect();
        assert_eq!(seen, names);
    }

    #[test]
    fn remove_evicts_entry_and_order() {
        let mut files = FileCollection::default();
        let first = tracked("a", Status::Preparing);
        let id = first.id();
        files.insert(first);
        files.insert(tracked("b", Status::Preparing));

        assert!(files.remove(id).is_some());
        assert!(!files.contains(id));
        assert_eq!(files.len(), 1);
        assert!(files.remove(id).is_none());
    }

    #[test]
    fn admitted_count_skips_rejections() {
        let mut files = FileCollection::default();
        files.insert(tracked("a", Status::Done));
        files.insert(tracked("b", Status::RejectedFileType));
        files.insert(tracked("c", Status::RejectedMaxFiles));
        files.insert(tracked("d", Status::ErrorFileSize));
        assert_eq!(files.admitted_count(), 2);
        assert_eq!(files.with_status(Status::Done).count(), 1);
        assert_eq!(files.snapshot().len(), 4);
    }
}
