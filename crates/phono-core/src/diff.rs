//! Keyed list reconciliation
//!
//! Computes the minimal change set between two snapshots of a collection:
//! which items were inserted, which were deleted, and which kept their
//! identity but changed contents. Items are matched across the snapshots by
//! an identity key; the contents comparison runs only on matched pairs.
//!
//! This drives the library's change detection (reconciling a fresh scan
//! against the stored index), but is generic over any item type that can
//! provide the two comparisons.

use std::collections::HashMap;
use std::hash::Hash;

/// An item that can be reconciled across two snapshots.
///
/// `key` is the identity used to match an item between the old and new
/// sequences (a primary key). `contents_eq` is the secondary comparison,
/// applied only after an identity match, that decides whether the matched
/// item counts as updated.
pub trait Keyed {
    type Key: Eq + Hash;

    /// Identity key used to match items across snapshots
    fn key(&self) -> Self::Key;

    /// Whether the non-key contents of two identity-matched items are equal
    fn contents_eq(&self, other: &Self) -> bool;
}

/// Result of reconciling an old snapshot against a new one
///
/// The three sets are disjoint. `updates` holds the *new* version of each
/// changed item. No ordering is guaranteed within a set.
#[derive(Debug, Clone)]
pub struct DiffResult<T> {
    /// Items present only in the new snapshot
    pub insertions: Vec<T>,
    /// Items present only in the old snapshot
    pub deletions: Vec<T>,
    /// New items whose identity matched an old item but whose contents differ
    pub updates: Vec<T>,
}

impl<T> Default for DiffResult<T> {
    fn default() -> Self {
        Self {
            insertions: Vec::new(),
            deletions: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<T> DiffResult<T> {
    /// Check if the two snapshots were identical
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty() && self.updates.is_empty()
    }

    /// Total number of changes across all three sets
    pub fn change_count(&self) -> usize {
        self.insertions.len() + self.deletions.len() + self.updates.len()
    }
}

/// Reconcile two snapshots of [`Keyed`] items.
///
/// Runs in O(n + m) using hash-keyed lookups. When a sequence contains the
/// same identity key more than once, the first occurrence wins and later
/// occurrences are ignored.
pub fn diff<T>(old: &[T], new: &[T]) -> DiffResult<T>
where
    T: Keyed + Clone,
{
    diff_by(old, new, T::key, T::contents_eq)
}

/// Reconcile two snapshots using explicit comparison functions.
///
/// Same semantics as [`diff`], for callers whose item type has no [`Keyed`]
/// implementation: `key_fn` extracts the identity key and `contents_eq`
/// compares the non-key contents of an identity-matched pair.
pub fn diff_by<T, K, KF, EF>(old: &[T], new: &[T], key_fn: KF, contents_eq: EF) -> DiffResult<T>
where
    T: Clone,
    K: Eq + Hash,
    KF: Fn(&T) -> K,
    EF: Fn(&T, &T) -> bool,
{
    // First occurrence wins when a key repeats within a sequence.
    let mut old_by_key: HashMap<K, &T> = HashMap::with_capacity(old.len());
    for item in old {
        old_by_key.entry(key_fn(item)).or_insert(item);
    }

    let mut new_by_key: HashMap<K, &T> = HashMap::with_capacity(new.len());
    for item in new {
        new_by_key.entry(key_fn(item)).or_insert(item);
    }

    let mut result = DiffResult::default();

    for (key, &new_item) in &new_by_key {
        match old_by_key.get(key) {
            None => result.insertions.push(new_item.clone()),
            Some(&old_item) => {
                if !contents_eq(old_item, new_item) {
                    result.updates.push(new_item.clone());
                }
            }
        }
    }

    for (key, &old_item) in &old_by_key {
        if !new_by_key.contains_key(key) {
            result.deletions.push(old_item.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        id: &'static str,
        last_modified: u64,
    }

    impl Entry {
        fn new(id: &'static str, last_modified: u64) -> Self {
            Self { id, last_modified }
        }
    }

    impl Keyed for Entry {
        type Key = &'static str;

        fn key(&self) -> Self::Key {
            self.id
        }

        fn contents_eq(&self, other: &Self) -> bool {
            self.last_modified == other.last_modified
        }
    }

    #[test]
    fn test_identical_snapshots_produce_no_changes() {
        let old = vec![Entry::new("First", 0), Entry::new("Second", 3)];
        let new = old.clone();

        let result = diff(&old, &new);
        assert!(result.is_empty());
        assert_eq!(result.change_count(), 0);
    }

    #[test]
    fn test_new_item_is_an_insertion() {
        let old = vec![Entry::new("First", 0)];
        let new = vec![Entry::new("First", 0), Entry::new("Second", 0)];

        let result = diff(&old, &new);
        assert_eq!(result.insertions.len(), 1);
        assert_eq!(result.insertions[0].id, "Second");
        assert!(result.deletions.is_empty());
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_missing_item_is_a_deletion() {
        let old = vec![Entry::new("First", 0), Entry::new("Second", 0)];
        let new = vec![Entry::new("Second", 0)];

        let result = diff(&old, &new);
        assert!(result.insertions.is_empty());
        assert_eq!(result.deletions.len(), 1);
        assert_eq!(result.deletions[0].id, "First");
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_changed_contents_is_an_update() {
        let old = vec![Entry::new("First", 0)];
        let new = vec![Entry::new("First", 7)];

        let result = diff(&old, &new);
        assert!(result.insertions.is_empty());
        assert!(result.deletions.is_empty());
        assert_eq!(result.updates.len(), 1);
        assert_eq!(result.updates[0].last_modified, 7);
    }

    #[test]
    fn test_mixed_changes() {
        let old = vec![
            Entry::new("First", 0),
            Entry::new("Second", 0),
            Entry::new("Third", 0),
            Entry::new("Fourth", 0),
        ];
        let new = vec![
            Entry::new("Second", 0),
            Entry::new("Third", 1),
            Entry::new("Fourth", 0),
            Entry::new("Fifth", 0),
        ];

        let result = diff(&old, &new);
        assert_eq!(result.insertions.len(), 1);
        assert_eq!(result.insertions[0].id, "Fifth");
        assert_eq!(result.deletions.len(), 1);
        assert_eq!(result.deletions[0].id, "First");
        assert_eq!(result.updates.len(), 1);
        assert_eq!(result.updates[0].id, "Third");
        assert_eq!(result.change_count(), 3);
    }

    #[test]
    fn test_duplicate_keys_first_occurrence_wins() {
        let old = vec![Entry::new("First", 0)];
        // Second occurrence of "First" has different contents but is ignored
        let new = vec![Entry::new("First", 0), Entry::new("First", 9)];

        let result = diff(&old, &new);
        assert!(result.is_empty());
    }

    #[test]
    fn test_diff_by_with_explicit_comparisons() {
        let old = vec![("a", 1), ("b", 2)];
        let new = vec![("b", 5), ("c", 3)];

        let result = diff_by(&old, &new, |item| item.0, |x, y| x.1 == y.1);
        assert_eq!(result.insertions, vec![("c", 3)]);
        assert_eq!(result.deletions, vec![("a", 1)]);
        assert_eq!(result.updates, vec![("b", 5)]);
    }

    #[test]
    fn test_empty_old_snapshot_inserts_everything() {
        let old: Vec<Entry> = Vec::new();
        let new = vec![Entry::new("First", 0), Entry::new("Second", 0)];

        let result = diff(&old, &new);
        assert_eq!(result.insertions.len(), 2);
        assert!(result.deletions.is_empty());
        assert!(result.updates.is_empty());
    }

    #[test]
    fn test_empty_new_snapshot_deletes_everything() {
        let old = vec![Entry::new("First", 0), Entry::new("Second", 0)];
        let new: Vec<Entry> = Vec::new();

        let result = diff(&old, &new);
        assert!(result.insertions.is_empty());
        assert_eq!(result.deletions.len(), 2);
        assert!(result.updates.is_empty());
    }
}
