//! `Array`: an insertion-ordered growable sequence.

use super::{Comparator, Container};

/// Insertion-ordered sequence of elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Array<T> {
    items: Vec<T>,
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Array<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append `value`, returning its index.
    pub fn push(&mut self, value: T) -> usize {
        self.items.push(value);
        self.items.len() - 1
    }

    /// Insert at `index`, shifting later elements. Returns `false` when
    /// `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> bool {
        if index > self.items.len() {
            return false;
        }
        self.items.insert(index, value);
        true
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Option<T> {
        self.items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Index of the first element equal to `value` under `cmp`.
    pub fn find<C: Comparator<T>>(&self, value: &T, cmp: &C) -> Option<usize> {
        self.items
            .iter()
            .position(|x| cmp.compare(x, value).is_eq())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Deep copy using an explicit per-element copier.
    pub fn deep_copy_with<F: FnMut(&T) -> T>(&self, copier: F) -> Self {
        Self {
            items: self.items.iter().map(copier).collect(),
        }
    }
}

impl<T> Container for Array<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn traverse<F: FnMut(&T)>(&self, visitor: F) {
        self.items.iter().for_each(visitor);
    }

    fn buffer_ptr(&self) -> *const () {
        self.items.as_ptr().cast()
    }

    fn deep_copy(&self) -> Self
    where
        T: Clone,
    {
        self.deep_copy_with(T::clone)
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Array<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::NaturalOrder;

    #[test]
    fn keeps_insertion_order() {
        let mut arr = Array::new();
        arr.push("c");
        arr.push("a");
        assert!(arr.insert(1, "b"));
        assert!(!arr.insert(9, "z"));
        assert_eq!(arr.as_slice(), &["c", "b", "a"]);
        assert_eq!(arr.find(&"a", &NaturalOrder), Some(2));
        assert_eq!(arr.find(&"q", &NaturalOrder), None);
    }

    #[test]
    fn set_and_remove() {
        let mut arr: Array<i32> = (0..4).collect();
        assert_eq!(arr.set(2, 20), Some(2));
        assert_eq!(arr.set(9, 1), None);
        assert_eq!(arr.remove(0), Some(0));
        assert_eq!(arr.remove(10), None);
        assert_eq!(arr.as_slice(), &[1, 20, 3]);
    }

    #[test]
    fn deep_and_shallow_copies() {
        let arr: Array<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let deep = arr.deep_copy();
        assert_eq!(deep, arr);
        assert_ne!(deep.buffer_ptr(), arr.buffer_ptr());

        let shallow = arr.shallow_copy();
        assert_eq!(shallow.buffer_ptr(), arr.buffer_ptr());
        assert_eq!(shallow.len(), 2);
        assert!(!shallow.is_owner());

        let upper = arr.deep_copy_with(|s| s.to_uppercase());
        assert_eq!(upper.as_slice(), &["X".to_string(), "Y".to_string()]);
    }
}
