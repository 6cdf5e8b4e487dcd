//! `UIntMap`: ordered `u32 → u32` map used for index remapping.

use super::{Container, Map};

/// Ordered map from unsigned indices to unsigned indices. Inserting an
/// existing key overwrites its value.
#[derive(Clone, Debug, Default)]
pub struct UIntMap {
    inner: Map<u32, u32>,
}

impl UIntMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `key → value`, returning the previous value.
    pub fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        self.inner.insert_or_replace(key, value)
    }

    pub fn get(&self, key: u32) -> Option<u32> {
        self.inner.get(&key).copied()
    }

    pub fn contains(&self, key: u32) -> bool {
        self.inner.contains_key(&key)
    }

    pub fn remove(&mut self, key: u32) -> Option<u32> {
        self.inner.remove(&key)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.inner.iter().map(|(k, v)| (*k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.inner.keys().copied()
    }
}

impl Container for UIntMap {
    type Item = (u32, u32);

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn traverse<F: FnMut(&(u32, u32))>(&self, visitor: F) {
        self.inner.traverse(visitor);
    }

    fn buffer_ptr(&self) -> *const () {
        self.inner.buffer_ptr()
    }

    fn deep_copy(&self) -> Self {
        Self {
            inner: self.inner.deep_copy(),
        }
    }
}

impl FromIterator<(u32, u32)> for UIntMap {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        let mut map = UIntMap::new();
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
    fn overwrite_and_order() {
        let mut map = UIntMap::new();
        assert_eq!(map.insert(40, 1), None);
        assert_eq!(map.insert(10, 0), None);
        assert_eq!(map.insert(40, 2), Some(1));
        assert_eq!(map.get(40), Some(2));
        assert_eq!(map.get(11), None);
        assert_eq!(map.iter().collect::<Vec<_>>(), [(10, 0), (40, 2)]);
        assert_eq!(map.remove(10), Some(0));
        assert!(!map.contains(10));
    }
}
