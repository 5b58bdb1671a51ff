//! The labeled-entity store underlying all three dictionaries of the
//! complementation procedure (states, sets of states, tuples).
//!
//! Entries live in an arena and are addressed by small integer handles; the
//! canonical key of every entry is additionally kept in an insertion-order
//! index. A handle returned by [`EntityStore::insert`] or
//! [`EntityStore::lookup`] stays valid until the entry is explicitly
//! [removed](EntityStore::remove), no matter how much the store grows in the
//! meantime.

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::{Equivalent, IndexMap};

/// An entry that can live in an [`EntityStore`].
///
/// The key is compound where the domain requires it: sets of states are keyed
/// by label *and* color, tuples by label *and* part, so that entries whose
/// labels differ only in their outer bracket pair can coexist.
pub trait StoreEntry {
    /// Canonical key identifying the entry within a store.
    type Key: Eq + Hash + Clone + Debug;
    /// Handle type used to refer to entries of this kind.
    type Id: Copy + Eq + Debug;

    fn key(&self) -> Self::Key;
    fn id(index: usize) -> Self::Id;
    fn index(id: Self::Id) -> usize;
}

/// Insertion-order-independent mapping from canonical key to entry.
#[derive(Debug, Clone)]
pub struct EntityStore<T: StoreEntry> {
    entries: Vec<Option<T>>,
    index: IndexMap<T::Key, usize>,
    initial: Option<T::Id>,
}

impl<T: StoreEntry> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoreEntry> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: IndexMap::new(),
            initial: None,
        }
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Looks up the handle of the entry with the given key.
    pub fn lookup<Q>(&self, key: &Q) -> Option<T::Id>
    where
        Q: ?Sized + Hash + Equivalent<T::Key>,
    {
        self.index.get(key).map(|&i| T::id(i))
    }

    /// Inserts a fresh entry and returns its handle.
    ///
    /// Panics if an entry with the same key is already present; callers are
    /// expected to [`lookup`](Self::lookup) first and reuse the incumbent.
    pub fn insert(&mut self, entry: T) -> T::Id {
        let key = entry.key();
        assert!(
            !self.index.contains_key(&key),
            "two entries with equal keys must never coexist in a store: {key:?}"
        );
        let slot = self.entries.len();
        self.entries.push(Some(entry));
        self.index.insert(key, slot);
        T::id(slot)
    }

    /// A reference to the entry behind `id`. Panics on a stale handle.
    pub fn get(&self, id: T::Id) -> &T {
        self.entries[T::index(id)]
            .as_ref()
            .expect("handle refers to a removed entry")
    }

    pub fn get_mut(&mut self, id: T::Id) -> &mut T {
        self.entries[T::index(id)]
            .as_mut()
            .expect("handle refers to a removed entry")
    }

    /// Removes the entry behind `id` and hands it back to the caller.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let entry = self.entries.get_mut(T::index(id))?.take()?;
        self.index.shift_remove(&entry.key());
        if self.initial == Some(id) {
            self.initial = None;
        }
        Some(entry)
    }

    /// Iterates over all live entries. The order is unspecified but stable
    /// for the lifetime of the store.
    pub fn iter(&self) -> impl Iterator<Item = (T::Id, &T)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|entry| (T::id(i), entry)))
    }

    /// The number of slots ever allocated. Together with [`slot`](Self::slot)
    /// this allows scans that keep working while new entries are appended.
    pub fn span(&self) -> usize {
        self.entries.len()
    }

    /// The live entry at slot `i`, if any.
    pub fn slot(&self, i: usize) -> Option<(T::Id, &T)> {
        self.entries.get(i)?.as_ref().map(|entry| (T::id(i), entry))
    }

    pub fn initial(&self) -> Option<T::Id> {
        self.initial
    }

    pub fn set_initial(&mut self, id: T::Id) {
        self.initial = Some(id);
    }
}
