//! `PtrSet`: a set of shared handles compared by identity.
//!
//! Two handles are the same element iff they point at the same allocation;
//! the pointees are never compared. Ordering is by address, which is stable
//! for the lifetime of the set but not across runs.

use std::cmp::Ordering;
use std::sync::Arc;

use super::sorted::{intersection_by, strictly_sorted_by, subtraction_by, union_by};
use super::{Container, SetAlgebra};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Identity set of `Arc<T>` handles.
#[derive(Debug)]
pub struct PtrSet<T: ?Sized> {
    items: Vec<Arc<T>>,
}

impl<T: ?Sized> Clone for PtrSet<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: ?Sized> Default for PtrSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

fn address<T: ?Sized>(handle: &Arc<T>) -> *const () {
    Arc::as_ptr(handle).cast()
}

fn by_address<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> Ordering {
    address(a).cmp(&address(b))
}

impl<T: ?Sized> PtrSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn search_ptr(&self, ptr: *const ()) -> Result<usize, usize> {
        self.items.binary_search_by(|probe| address(probe).cmp(&ptr))
    }

    /// Insert a handle. A handle to an allocation already present is
    /// rejected and `false` returned.
    pub fn insert(&mut self, handle: Arc<T>) -> bool {
        match self.search_ptr(address(&handle)) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, handle);
                crate::debug_invariants!(self.validate_invariants(), "PtrSet::insert");
                true
            }
        }
    }

    pub fn contains(&self, handle: &Arc<T>) -> bool {
        self.search_ptr(address(handle)).is_ok()
    }

    /// Membership by raw address, for callers holding only a reference.
    pub fn contains_ptr(&self, ptr: *const T) -> bool {
        self.search_ptr(ptr.cast()).is_ok()
    }

    pub fn remove(&mut self, handle: &Arc<T>) -> Option<Arc<T>> {
        let idx = self.search_ptr(address(handle)).ok()?;
        Some(self.items.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }
}

impl<T: ?Sized> Container for PtrSet<T> {
    type Item = Arc<T>;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn traverse<F: FnMut(&Arc<T>)>(&self, visitor: F) {
        self.items.iter().for_each(visitor);
    }

    fn buffer_ptr(&self) -> *const () {
        self.items.as_ptr().cast()
    }

    /// Copies the handles into a fresh buffer; the pointees stay shared, so
    /// the copy holds exactly the same identities.
    fn deep_copy(&self) -> Self {
        Self {
            items: self.items.iter().map(Arc::clone).collect(),
        }
    }
}

impl<T: ?Sized> SetAlgebra for PtrSet<T> {
    fn union(&self, other: &Self) -> Self {
        Self {
            items: union_by(&self.items, &other.items, by_address),
        }
    }

    fn intersection(&self, other: &Self) -> Self {
        Self {
            items: intersection_by(&self.items, &other.items, by_address),
        }
    }

    fn subtraction(&self, other: &Self) -> Self {
        Self {
            items: subtraction_by(&self.items, &other.items, by_address),
        }
    }
}

impl<T: ?Sized> DebugInvariants for PtrSet<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PtrSet invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if strictly_sorted_by(&self.items, by_address) {
            Ok(())
        } else {
            Err(StgError::invariant(
                "PtrSet",
                "handles are not unique and address-ordered",
            ))
        }
    }
}

impl<T: ?Sized> FromIterator<Arc<T>> for PtrSet<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        let mut set = PtrSet::new();
        for h in iter {
            set.insert(h);
        }
        set
    }
}
