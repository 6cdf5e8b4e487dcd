//! Container primitives used for per-rank mesh bookkeeping.
//!
//! Every container owns its storage outright. Element comparison comes from
//! a [`Comparator`] supplied at construction, copying from `Clone` (or an
//! explicit copier via `deep_copy_with`), and cleanup from `Drop`.
//!
//! Copy semantics:
//! - [`Container::deep_copy`] duplicates every element into fresh storage;
//!   the copy never aliases the source.
//! - [`Container::shallow_copy`] returns a [`Shallow`] view sharing the
//!   source's buffer. A view never owns that buffer, so dropping it cannot
//!   free memory the owner still needs, and the borrow checker keeps the
//!   owner alive for as long as any view exists.

pub mod array;
pub mod compare;
pub mod linked_list;
pub mod map;
pub mod max_heap;
pub mod ptr_set;
pub mod set;
pub mod uint_map;

pub(crate) mod sorted;

use std::ops::Deref;

pub use array::Array;
pub use compare::{Comparator, NaturalOrder, Reverse};
pub use linked_list::LinkedList;
pub use map::Map;
pub use max_heap::{Doubling, FixedIncrement, GrowthPolicy, MaxHeap};
pub use ptr_set::PtrSet;
pub use set::Set;
pub use uint_map::UIntMap;

/// Behaviour shared by all container primitives.
pub trait Container {
    /// Element type visited by [`traverse`](Self::traverse).
    type Item;

    /// Number of live elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `visitor` to every live element exactly once, in the
    /// container's defined order.
    fn traverse<F: FnMut(&Self::Item)>(&self, visitor: F);

    /// Address of the backing storage, for alias checks. Empty containers
    /// may report a dangling address shared with other empty containers.
    fn buffer_ptr(&self) -> *const ();

    /// Duplicate every element into freshly allocated storage.
    fn deep_copy(&self) -> Self
    where
        Self: Sized,
        Self::Item: Clone;

    /// A non-owning view sharing this container's storage.
    fn shallow_copy(&self) -> Shallow<'_, Self>
    where
        Self: Sized,
    {
        Shallow { owner: self }
    }
}

/// Set algebra for the comparator-ordered containers.
///
/// Results are newly allocated and independent of both operands. Where an
/// element (or key) appears in both operands the left one is kept.
pub trait SetAlgebra: Sized {
    /// Every element of `self` and of `other`, without duplicates.
    fn union(&self, other: &Self) -> Self;
    /// Elements of `self` that compare equal to some element of `other`.
    fn intersection(&self, other: &Self) -> Self;
    /// Elements of `self` that compare equal to no element of `other`.
    fn subtraction(&self, other: &Self) -> Self;
}

/// A shallow copy: a borrowed view over another container's storage.
///
/// Reports the same length, elements and buffer address as its owner.
#[derive(Debug)]
pub struct Shallow<'a, C> {
    owner: &'a C,
}

impl<C> Clone for Shallow<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Shallow<'_, C> {}

impl<'a, C: Container> Shallow<'a, C> {
    /// Always `false`: a view never frees the shared buffer.
    pub fn is_owner(&self) -> bool {
        false
    }

    /// The container this view aliases.
    pub fn owner(&self) -> &'a C {
        self.owner
    }

    /// Promote the view into an owning deep copy.
    pub fn to_owned_copy(&self) -> C
    where
        C::Item: Clone,
    {
        self.owner.deep_copy()
    }
}

impl<C> Deref for Shallow<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.owner
    }
}
