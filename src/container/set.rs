//! `Set`: unique elements kept in comparator order.

use super::sorted::{intersection_by, strictly_sorted_by, subtraction_by, union_by};
use super::{Comparator, Container, NaturalOrder, SetAlgebra};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Ordered set of unique elements.
///
/// # Invariants
/// No two stored elements compare equal, and iteration follows the
/// comparator's order.
#[derive(Clone, Debug)]
pub struct Set<T, C = NaturalOrder> {
    items: Vec<T>,
    cmp: C,
}

impl<T: Ord> Set<T, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for Set<T, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> Set<T, C> {
    /// Empty set ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            items: Vec::new(),
            cmp,
        }
    }

    fn search(&self, value: &T) -> Result<usize, usize> {
        self.items
            .binary_search_by(|probe| self.cmp.compare(probe, value))
    }

    /// Insert `value`. A duplicate is rejected and `false` returned.
    pub fn insert(&mut self, value: T) -> bool {
        match self.search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, value);
                crate::debug_invariants!(self.validate_invariants(), "Set::insert");
                true
            }
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.search(value).is_ok()
    }

    /// The stored element comparing equal to `value`.
    pub fn find(&self, value: &T) -> Option<&T> {
        self.search(value).ok().map(|i| &self.items[i])
    }

    pub fn remove(&mut self, value: &T) -> Option<T> {
        let idx = self.search(value).ok()?;
        Some(self.items.remove(idx))
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Deep copy using an explicit per-element copier. The copier must
    /// preserve ordering.
    pub fn deep_copy_with<F: FnMut(&T) -> T>(&self, copier: F) -> Self
    where
        C: Clone,
    {
        Self {
            items: self.items.iter().map(copier).collect(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<T, C: Comparator<T>> Container for Set<T, C>
where
    C: Clone,
{
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

impl<T: Clone, C: Comparator<T> + Clone> SetAlgebra for Set<T, C> {
    fn union(&self, other: &Self) -> Self {
        Self {
            items: union_by(&self.items, &other.items, |a, b| self.cmp.compare(a, b)),
            cmp: self.cmp.clone(),
        }
    }

    fn intersection(&self, other: &Self) -> Self {
        Self {
            items: intersection_by(&self.items, &other.items, |a, b| self.cmp.compare(a, b)),
            cmp: self.cmp.clone(),
        }
    }

    fn subtraction(&self, other: &Self) -> Self {
        Self {
            items: subtraction_by(&self.items, &other.items, |a, b| self.cmp.compare(a, b)),
            cmp: self.cmp.clone(),
        }
    }
}

impl<T, C: Comparator<T>> DebugInvariants for Set<T, C> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Set invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if strictly_sorted_by(&self.items, |a, b| self.cmp.compare(a, b)) {
            Ok(())
        } else {
            Err(StgError::invariant(
                "Set",
                "elements are not unique and strictly ordered",
            ))
        }
    }
}

impl<T: Ord> FromIterator<T> for Set<T, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new();
        for x in iter {
            set.insert(x);
        }
        set
    }
}

impl<'a, T, C> IntoIterator for &'a Set<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn rejects_duplicates() {
        let mut set = Set::new();
        assert!(set.insert(4));
        assert!(set.insert(1));
        assert!(!set.insert(4));
        assert_eq!(set.as_slice(), &[1, 4]);
        assert_eq!(set.find(&1), Some(&1));
        assert_eq!(set.find(&2), None);
    }

    #[test]
    fn custom_comparator_defines_equality() {
        // case-insensitive names
        let cmp = |a: &String, b: &String| a.to_lowercase().cmp(&b.to_lowercase());
        let mut set = Set::with_comparator(cmp);
        assert!(set.insert("Mesh".to_string()));
        assert!(!set.insert("MESH".to_string()));
        assert!(set.insert("bc".to_string()));
        let names: Vec<_> = set.iter().map(String::as_str).collect();
        assert_eq!(names, ["bc", "Mesh"]);
    }

    #[test]
    fn algebra() {
        let a: Set<u32> = [1, 2, 3, 4].into_iter().collect();
        let b: Set<u32> = [3, 4, 5].into_iter().collect();
        assert_eq!(a.union(&b).as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(a.intersection(&b).as_slice(), &[3, 4]);
        assert_eq!(a.subtraction(&b).as_slice(), &[1, 2]);
        assert_ne!(a.union(&b).buffer_ptr(), a.buffer_ptr());
    }

    #[test]
    fn union_keeps_left_element_on_ties() {
        let by_id = |a: &(u32, &'static str), b: &(u32, &'static str)| -> Ordering { a.0.cmp(&b.0) };
        let mut a = Set::with_comparator(by_id);
        a.insert((1, "left"));
        let mut b = Set::with_comparator(by_id);
        b.insert((1, "right"));
        b.insert((2, "right"));
        let u = a.union(&b);
        assert_eq!(u.as_slice(), &[(1, "left"), (2, "right")]);
    }

    #[test]
    fn invariants_hold_after_removal() {
        let mut set: Set<i64> = (0..10).rev().collect();
        assert_eq!(set.remove(&5), Some(5));
        assert_eq!(set.remove(&5), None);
        assert!(set.validate_invariants().is_ok());
        assert_eq!(set.len(), 9);
    }
}
