//! `Map`: unique keys kept in comparator order, each with a value.

use super::sorted::{intersection_by, strictly_sorted_by, subtraction_by, union_by};
use super::{Comparator, Container, NaturalOrder, SetAlgebra};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Ordered key/value map with comparator-defined key equality.
///
/// # Invariants
/// Keys are unique under the comparator and stored in its order.
#[derive(Clone, Debug)]
pub struct Map<K, V, C = NaturalOrder> {
    entries: Vec<(K, V)>,
    cmp: C,
}

impl<K: Ord, V> Map<K, V, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K: Ord, V> Default for Map<K, V, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> Map<K, V, C> {
    /// Empty map ordered by `cmp` over keys.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            entries: Vec::new(),
            cmp,
        }
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(probe, _)| self.cmp.compare(probe, key))
    }

    /// Insert `key → value`. An existing key is left untouched and `false`
    /// returned.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.search(&key) {
            Ok(_) => false,
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                crate::debug_invariants!(self.validate_invariants(), "Map::insert");
                true
            }
        }
    }

    /// Insert `key → value`, replacing and returning any previous value.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                None
            }
        }
    }

    /// Value mapped from `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).ok().map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.search(key).ok()?;
        Some(&mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.search(key).ok()?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }

    /// Deep copy using an explicit per-entry copier. The copier must keep
    /// keys in the same order.
    pub fn deep_copy_with<F: FnMut(&(K, V)) -> (K, V)>(&self, copier: F) -> Self
    where
        C: Clone,
    {
        Self {
            entries: self.entries.iter().map(copier).collect(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C: Comparator<K> + Clone> Container for Map<K, V, C> {
    type Item = (K, V);

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn traverse<F: FnMut(&(K, V))>(&self, visitor: F) {
        self.entries.iter().for_each(visitor);
    }

    fn buffer_ptr(&self) -> *const () {
        self.entries.as_ptr().cast()
    }

    fn deep_copy(&self) -> Self
    where
        (K, V): Clone,
    {
        self.deep_copy_with(Clone::clone)
    }
}

impl<K: Clone, V: Clone, C: Comparator<K> + Clone> SetAlgebra for Map<K, V, C> {
    fn union(&self, other: &Self) -> Self {
        Self {
            entries: union_by(&self.entries, &other.entries, |a, b| {
                self.cmp.compare(&a.0, &b.0)
            }),
            cmp: self.cmp.clone(),
        }
    }

    fn intersection(&self, other: &Self) -> Self {
        Self {
            entries: intersection_by(&self.entries, &other.entries, |a, b| {
                self.cmp.compare(&a.0, &b.0)
            }),
            cmp: self.cmp.clone(),
        }
    }

    fn subtraction(&self, other: &Self) -> Self {
        Self {
            entries: subtraction_by(&self.entries, &other.entries, |a, b| {
                self.cmp.compare(&a.0, &b.0)
            }),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C: Comparator<K>> DebugInvariants for Map<K, V, C> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Map invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if strictly_sorted_by(&self.entries, |a, b| self.cmp.compare(&a.0, &b.0)) {
            Ok(())
        } else {
            Err(StgError::invariant(
                "Map",
                "keys are not unique and strictly ordered",
            ))
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Map<K, V, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_keep_first_value() {
        let mut map = Map::new();
        assert!(map.insert(3, "three"));
        assert!(!map.insert(3, "drei"));
        assert_eq!(map.get(&3), Some(&"three"));
        assert_eq!(map.insert_or_replace(3, "trois"), Some("three"));
        assert_eq!(map.get(&3), Some(&"trois"));
        assert_eq!(map.get(&4), None);
    }

    #[test]
    fn keys_iterate_in_order() {
        let map: Map<u32, char> = [(5, 'e'), (1, 'a'), (3, 'c')].into_iter().collect();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, [1, 3, 5]);
        let mut visited = Vec::new();
        map.traverse(|(k, v)| visited.push((*k, *v)));
        assert_eq!(visited, [(1, 'a'), (3, 'c'), (5, 'e')]);
    }

    #[test]
    fn algebra_by_key() {
        let a: Map<u32, &str> = [(1, "a1"), (2, "a2")].into_iter().collect();
        let b: Map<u32, &str> = [(2, "b2"), (3, "b3")].into_iter().collect();
        let u = a.union(&b);
        assert_eq!(u.as_slice(), &[(1, "a1"), (2, "a2"), (3, "b3")]);
        assert_eq!(a.subtraction(&b).as_slice(), &[(1, "a1")]);
        assert_eq!(a.intersection(&b).as_slice(), &[(2, "a2")]);
    }

    #[test]
    fn get_mut_and_remove() {
        let mut map: Map<&str, Vec<u32>> = Map::new();
        map.insert("ghosts", vec![]);
        map.get_mut(&"ghosts").unwrap().push(9);
        assert_eq!(map.remove(&"ghosts"), Some(vec![9]));
        assert!(map.is_empty());
    }
}
