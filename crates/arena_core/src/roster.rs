//! Keyed storage for long-lived arena entities (enemies, structures).
//!
//! Uses a `HashMap` for O(1) lookup by ID, with deterministic iteration via
//! sorted keys when a tick walks the roster. Removal during a tick is done
//! mark-and-sweep style by the caller: the tick iterates a snapshot of
//! [`Roster::sorted_ids`] and re-fetches each entry, so entries that died or
//! were removed earlier in the same tick are simply skipped.

use std::collections::HashMap;

/// Unique identifier for a roster entry.
pub type EntityId = u64;

/// Storage for one kind of arena entity.
#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: HashMap<EntityId, T>,
    next_id: EntityId,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Roster<T> {
    /// Create an empty roster. IDs start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert an entry built from its freshly assigned ID.
    pub fn insert_with(&mut self, build: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, build(id));
        id
    }

    /// Remove an entry by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entries.remove(&id)
    }

    /// Get an entry by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Get a mutable reference to an entry by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Check if an entry exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get sorted IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over entries in ID order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.sorted_ids()
            .into_iter()
            .filter_map(move |id| self.entries.get(&id).map(|entry| (id, entry)))
    }

    /// Remove every entry matching `predicate`, returning the removed IDs in order.
    pub fn sweep(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<EntityId> {
        let mut removed: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(id, _)| *id)
            .collect();
        removed.sort_unstable();
        for id in &removed {
            self.entries.remove(id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_from_one() {
        let mut roster = Roster::new();
        let a = roster.insert_with(|id| id * 10);
        let b = roster.insert_with(|id| id * 10);
        assert_eq!((a, b), (1, 2));
        assert_eq!(roster.get(b), Some(&20));
    }

    #[test]
    fn test_sorted_iteration() {
        let mut roster = Roster::new();
        for _ in 0..20 {
            roster.insert_with(|id| id);
        }
        let ids: Vec<_> = roster.iter_sorted().map(|(id, _)| id).collect();
        let mut expected = ids.clone();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_sweep_removes_matching() {
        let mut roster = Roster::new();
        for _ in 0..6 {
            roster.insert_with(|id| id);
        }
        let removed = roster.sweep(|value| value % 2 == 0);
        assert_eq!(removed, vec![2, 4, 6]);
        assert_eq!(roster.len(), 3);
        assert!(!roster.contains(4));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut roster = Roster::new();
        let a = roster.insert_with(|_| ());
        roster.remove(a);
        let b = roster.insert_with(|_| ());
        assert_ne!(a, b);
    }
}
