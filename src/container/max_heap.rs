//! `MaxHeap`: an array-backed binary max-heap with a pluggable growth policy.
//!
//! The heap tracks its own logical capacity. When an insertion would exceed
//! it, the [`GrowthPolicy`] decides the next capacity and the backing array
//! is extended to exactly that size.

use super::{Comparator, Container, NaturalOrder};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Decides how far to extend a full heap.
pub trait GrowthPolicy {
    /// Capacity to grow to from `current`. Values not larger than `current`
    /// are treated as `current + 1`.
    fn next_capacity(&self, current: usize) -> usize;
}

impl<F: Fn(usize) -> usize> GrowthPolicy for F {
    fn next_capacity(&self, current: usize) -> usize {
        self(current)
    }
}

/// Double the capacity (starting from 1).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Doubling;

impl GrowthPolicy for Doubling {
    fn next_capacity(&self, current: usize) -> usize {
        current.saturating_mul(2).max(1)
    }
}

/// Extend by a fixed number of slots each time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedIncrement(pub usize);

impl GrowthPolicy for FixedIncrement {
    fn next_capacity(&self, current: usize) -> usize {
        current.saturating_add(self.0.max(1))
    }
}

/// Binary max-heap ordered by a comparator.
///
/// # Invariants
/// For every index `i > 0`, `items[(i - 1) / 2] >= items[i]` under the
/// comparator, and `len <= capacity`.
#[derive(Clone, Debug)]
pub struct MaxHeap<T, C = NaturalOrder, G = Doubling> {
    items: Vec<T>,
    capacity: usize,
    cmp: C,
    growth: G,
    extensions: usize,
}

impl<T: Ord> MaxHeap<T, NaturalOrder, Doubling> {
    pub fn new() -> Self {
        Self::with_policy(NaturalOrder, Doubling, 0)
    }
}

impl<T: Ord> Default for MaxHeap<T, NaturalOrder, Doubling> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> MaxHeap<T, C, Doubling> {
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_policy(cmp, Doubling, 0)
    }
}

impl<T, C: Comparator<T>, G: GrowthPolicy> MaxHeap<T, C, G> {
    /// Heap ordered by `cmp`, extended by `growth`, starting with room for
    /// `initial_capacity` elements.
    pub fn with_policy(cmp: C, growth: G, initial_capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(initial_capacity),
            capacity: initial_capacity,
            cmp,
            growth,
            extensions: 0,
        }
    }

    /// Logical capacity before the next extension.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times the backing array has been extended.
    pub fn extensions(&self) -> usize {
        self.extensions
    }

    fn extend(&mut self) {
        let next = self
            .growth
            .next_capacity(self.capacity)
            .max(self.capacity + 1);
        self.items.reserve_exact(next - self.items.len());
        log::trace!("MaxHeap extended from {} to {next} slots", self.capacity);
        self.capacity = next;
        self.extensions += 1;
    }

    fn greater(&self, a: usize, b: usize) -> bool {
        self.cmp.compare(&self.items[a], &self.items[b]).is_gt()
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.greater(idx, parent) {
                break;
            }
            self.items.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut largest = idx;
            if left < len && self.greater(left, largest) {
                largest = left;
            }
            if right < len && self.greater(right, largest) {
                largest = right;
            }
            if largest == idx {
                break;
            }
            self.items.swap(idx, largest);
            idx = largest;
        }
    }

    /// Insert `value`, extending the array first if it is full.
    pub fn insert(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.extend();
        }
        self.items.push(value);
        let last = self.items.len() - 1;
        self.sift_up(last);
        crate::debug_invariants!(self.validate_invariants(), "MaxHeap::insert");
    }

    /// Remove and return the maximum element.
    pub fn extract(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let max = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        crate::debug_invariants!(self.validate_invariants(), "MaxHeap::extract");
        Some(max)
    }

    /// The maximum element, without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Elements in heap (array) order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Drain the heap into a non-increasing vector.
    pub fn into_sorted_desc(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.items.len());
        while let Some(x) = self.extract() {
            out.push(x);
        }
        out
    }

    /// Deep copy using an explicit per-element copier. The copier must
    /// preserve ordering.
    pub fn deep_copy_with<F: FnMut(&T) -> T>(&self, copier: F) -> Self
    where
        C: Clone,
        G: Clone,
    {
        let mut items = Vec::with_capacity(self.capacity);
        items.extend(self.items.iter().map(copier));
        Self {
            items,
            capacity: self.capacity,
            cmp: self.cmp.clone(),
            growth: self.growth.clone(),
            extensions: self.extensions,
        }
    }
}

impl<T, C, G> Container for MaxHeap<T, C, G>
where
    C: Comparator<T> + Clone,
    G: GrowthPolicy + Clone,
{
    type Item = T;

    fn len(&self) -> usize {
        self.items.len()
    }

    /// Visits elements in heap (array) order.
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

impl<T, C: Comparator<T>, G> DebugInvariants for MaxHeap<T, C, G> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "MaxHeap invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if self.items.len() > self.capacity {
            return Err(StgError::invariant(
                "MaxHeap",
                format!("{} elements exceed capacity {}", self.items.len(), self.capacity),
            ));
        }
        for idx in 1..self.items.len() {
            let parent = (idx - 1) / 2;
            if self
                .cmp
                .compare(&self.items[parent], &self.items[idx])
                .is_lt()
            {
                return Err(StgError::invariant(
                    "MaxHeap",
                    format!("parent {parent} is smaller than child {idx}"),
                ));
            }
        }
        Ok(())
    }
}
