//! Registry of (subject, resource class) pairs whose cached reads are
//! suspect because a write landed. Entries are written before a write
//! returns and cleared by the first read that demonstrably saw the
//! post-write state.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::types::{ResourceClass, SubjectId};

pub trait InvalidationStore: Send + Sync {
    /// Records that cached reads for (subject, class) may be stale.
    /// Marking an already-marked pair refreshes its timestamp.
    fn mark_invalidated(&self, subject: &SubjectId, class: &ResourceClass);

    fn is_invalidated(&self, subject: &SubjectId, class: &ResourceClass) -> bool;

    /// Clears the entry for (subject, class) unless it was written after
    /// `read_started_at`. A read can only vouch for data it actually saw,
    /// so a read that raced a newer write must leave the entry in place.
    fn mark_fresh(&self, subject: &SubjectId, class: &ResourceClass, read_started_at: Instant);
}

/// Process-local registry. The deployment runs a single router process,
/// so a map behind a lock is all the coordination the registry needs.
#[derive(Default)]
pub struct MemoryInvalidationStore {
    entries: RwLock<HashMap<(SubjectId, ResourceClass), Instant>>,
}

impl MemoryInvalidationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl InvalidationStore for MemoryInvalidationStore {
    fn mark_invalidated(&self, subject: &SubjectId, class: &ResourceClass) {
        let mut entries = self.entries.write();
        entries.insert((subject.clone(), class.clone()), Instant::now());
    }

    fn is_invalidated(&self, subject: &SubjectId, class: &ResourceClass) -> bool {
        self.entries
            .read()
            .contains_key(&(subject.clone(), class.clone()))
    }

    fn mark_fresh(&self, subject: &SubjectId, class: &ResourceClass, read_started_at: Instant) {
        let key = (subject.clone(), class.clone());
        let mut entries = self.entries.write();
        if let Some(&invalidated_at) = entries.get(&key)
            && invalidated_at <= read_started_at
        {
            entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn subject() -> SubjectId {
        SubjectId::new("user-1")
    }

    #[tokio::test(start_paused = true)]
    async fn marked_pair_reads_as_invalidated() {
        let store = MemoryInvalidationStore::new();
        assert!(!store.is_invalidated(&subject(), &ResourceClass::tasks()));

        store.mark_invalidated(&subject(), &ResourceClass::tasks());
        assert!(store.is_invalidated(&subject(), &ResourceClass::tasks()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn double_mark_keeps_a_single_entry() {
        let store = MemoryInvalidationStore::new();
        store.mark_invalidated(&subject(), &ResourceClass::tasks());
        store.mark_invalidated(&subject(), &ResourceClass::tasks());
        assert_eq!(store.len(), 1);
        assert!(store.is_invalidated(&subject(), &ResourceClass::tasks()));
    }

    #[tokio::test(start_paused = true)]
    async fn read_started_after_write_clears_the_entry() {
        let store = MemoryInvalidationStore::new();
        store.mark_invalidated(&subject(), &ResourceClass::tasks());

        tokio::time::advance(Duration::from_millis(5)).await;
        store.mark_fresh(&subject(), &ResourceClass::tasks(), Instant::now());
        assert!(!store.is_invalidated(&subject(), &ResourceClass::tasks()));
    }

    #[tokio::test(start_paused = true)]
    async fn read_started_before_write_cannot_clear_the_entry() {
        let store = MemoryInvalidationStore::new();
        let read_started = Instant::now();

        tokio::time::advance(Duration::from_millis(5)).await;
        store.mark_invalidated(&subject(), &ResourceClass::tasks());

        store.mark_fresh(&subject(), &ResourceClass::tasks(), read_started);
        assert!(store.is_invalidated(&subject(), &ResourceClass::tasks()));

        // A later read clears it as usual.
        tokio::time::advance(Duration::from_millis(5)).await;
        store.mark_fresh(&subject(), &ResourceClass::tasks(), Instant::now());
        assert!(!store.is_invalidated(&subject(), &ResourceClass::tasks()));
    }

    #[tokio::test(start_paused = true)]
    async fn read_started_at_the_write_instant_clears_the_entry() {
        let store = MemoryInvalidationStore::new();
        store.mark_invalidated(&subject(), &ResourceClass::tasks());
        // Same tick: the read began after the write returned, so it saw
        // post-write state even though no time elapsed.
        store.mark_fresh(&subject(), &ResourceClass::tasks(), Instant::now());
        assert!(!store.is_invalidated(&subject(), &ResourceClass::tasks()));
    }

    #[tokio::test(start_paused = true)]
    async fn entries_are_scoped_to_subject_and_class() {
        let store = MemoryInvalidationStore::new();
        store.mark_invalidated(&subject(), &ResourceClass::tasks());

        assert!(!store.is_invalidated(&SubjectId::new("user-2"), &ResourceClass::tasks()));
        assert!(!store.is_invalidated(&subject(), &ResourceClass::drive_files()));
        assert!(!store.is_invalidated(&subject(), &ResourceClass::project_files("p1")));

        store.mark_invalidated(&subject(), &ResourceClass::project_files("p1"));
        assert!(store.is_invalidated(&subject(), &ResourceClass::project_files("p1")));
        assert!(!store.is_invalidated(&subject(), &ResourceClass::project_files("p2")));
    }
}
