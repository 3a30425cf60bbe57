//! Capacity-bounded map with least-recently-used eviction.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

struct Slot<V> {
    value: V,
    stamp: u64,
}

/// Map holding at most `capacity` entries.
///
/// Recency is tracked with a monotonically increasing stamp per access; the
/// `recency` index maps each live stamp back to its key, so the smallest stamp
/// is always the least recently used entry.
pub(crate) struct LruStore<K, V> {
    capacity: usize,
    entries: HashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    next_stamp: u64,
}

impl<K, V> LruStore<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    /// Mutable access that also marks the entry as most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let stamp = self.stamp();
        let slot = self.entries.get_mut(key)?;

        if let Some(owned_key) = self.recency.remove(&slot.stamp) {
            self.recency.insert(stamp, owned_key);
        }
        slot.stamp = stamp;

        Some(&mut slot.value)
    }

    /// Insert or replace `key`, marking it most recently used.
    ///
    /// When a new key arrives at capacity, the least recently used entry is
    /// removed first and returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let stamp = self.stamp();

        if let Some(slot) = self.entries.get_mut(&key) {
            self.recency.remove(&slot.stamp);
            slot.value = value;
            slot.stamp = stamp;
            self.recency.insert(stamp, key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.pop_least_recent()
        } else {
            None
        };

        self.recency.insert(stamp, key.clone());
        self.entries.insert(key, Slot { value, stamp });

        evicted
    }

    fn pop_least_recent(&mut self) -> Option<(K, V)> {
        let (_, key) = self.recency.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    /// Keep only entries for which `keep` returns true. Returns how many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &V) -> bool,
    {
        let before = self.entries.len();
        let recency = &mut self.recency;
        self.entries.retain(|key, slot| {
            let retained = keep(key, &slot.value);
            if !retained {
                recency.remove(&slot.stamp);
            }
            retained
        });
        before - self.entries.len()
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}
