//! Ordered per-bucket event lists.

use crate::bucket::BucketKind;
use crate::event::Event;

/// Events grouped by bucket, in first-seen bucket order.
pub type Activity = OrderedMultimap<BucketKind, Event>;

/// A multimap that remembers the order keys were first inserted.
///
/// Merging appends the other map's values per key, so merging day halves and
/// merging whole days are the same operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMultimap<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for OrderedMultimap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> OrderedMultimap<K, V> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The value list for `key`, inserting an empty one at the end if absent.
    pub fn entry(&mut self, key: K) -> &mut Vec<V> {
        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key, Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Values for `key`, empty if the key was never inserted.
    pub fn get(&self, key: &K) -> &[V] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// Appends every list of `other` onto this map, key by key.
    pub fn merge(&mut self, other: Self) {
        for (key, values) in other.entries {
            self.entry(key).extend(values);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values across all keys.
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

impl<K, V> IntoIterator for OrderedMultimap<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
