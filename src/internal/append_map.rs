//! Append-only open-addressing map for provider registries.
//!
//! Registries are written during configuration and then only read. That
//! allows a simpler layout than a general map: entries live densely in
//! insertion order and a power-of-two probe table stores their indices.
//! Lookups hash once and probe linearly, wrapping at the end of the table.
//! Nothing is ever removed, so there are no tombstones.

use std::fmt;
use std::hash::{BuildHasher, Hash};

const EMPTY: usize = usize::MAX;
const MIN_SLOTS: usize = 8;

struct Entry<K, V> {
    hash: u64,
    key: K,
    value: V,
}

/// Insert-once map with insertion-ordered iteration.
///
/// # Examples
///
/// ```
/// use saber_di::AppendMap;
///
/// let mut map = AppendMap::new();
/// assert!(map.insert("a", 1).is_ok());
/// assert_eq!(map.insert("a", 2), Err(("a", 2)));
/// assert_eq!(map.get(&"a"), Some(&1));
/// ```
pub struct AppendMap<K, V, S = ahash::RandomState> {
    entries: Vec<Entry<K, V>>,
    slots: Box<[usize]>,
    hasher: S,
}

impl<K: Hash + Eq, V> AppendMap<K, V, ahash::RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(ahash::RandomState::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut map = Self::new();
        map.reserve(capacity);
        map
    }
}

impl<K: Hash + Eq, V> Default for AppendMap<K, V, ahash::RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> AppendMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            entries: Vec::new(),
            slots: vec![EMPTY; MIN_SLOTS].into_boxed_slice(),
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a new entry. An existing entry for the key is never replaced;
    /// the rejected pair is handed back instead.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let hash = self.hasher.hash_one(&key);
        if self.find(hash, &key).is_some() {
            return Err((key, value));
        }
        self.reserve(1);
        let slot = self.free_slot(hash);
        self.slots[slot] = self.entries.len();
        self.entries.push(Entry { hash, key, value });
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hasher.hash_one(key);
        self.find(hash, key).map(|index| &self.entries[index].value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|e| (&e.key, &e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Makes room for `additional` more entries without exceeding a 3/4 load.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.entries.len() + additional;
        if needed * 4 <= self.slots.len() * 3 {
            return;
        }
        let mut slot_count = self.slots.len();
        while needed * 4 > slot_count * 3 {
            slot_count *= 2;
        }
        self.rehash(slot_count);
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    fn find(&self, hash: u64, key: &K) -> Option<usize> {
        let mask = self.mask();
        let mut slot = hash as usize & mask;
        loop {
            let index = self.slots[slot];
            if index == EMPTY {
                return None;
            }
            let entry = &self.entries[index];
            if entry.hash == hash && entry.key == *key {
                return Some(index);
            }
            slot = (slot + 1) & mask;
        }
    }

    fn free_slot(&self, hash: u64) -> usize {
        let mask = self.mask();
        let mut slot = hash as usize & mask;
        while self.slots[slot] != EMPTY {
            slot = (slot + 1) & mask;
        }
        slot
    }

    fn rehash(&mut self, slot_count: usize) {
        debug_assert!(slot_count.is_power_of_two());
        self.slots = vec![EMPTY; slot_count].into_boxed_slice();
        for index in 0..self.entries.len() {
            let slot = self.free_slot(self.entries[index].hash);
            self.slots[slot] = index;
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for AppendMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.key, &e.value)))
            .finish()
    }
}
