//! Global ↔ local index mapping under a domain decomposition.
//!
//! Every rank numbers the entries (elements or nodes) it owns contiguously
//! from zero. [`IndexDecomposition::global_to_local`] maps a whole-domain
//! index to that local numbering and returns a value `>= local_count()` for
//! anything the rank does not own, so callers must check the result before
//! indexing a local array. All mappings are pure functions of the
//! decomposition state; ranks holding the same parameters agree on every
//! result.

pub mod explicit;
pub mod rank;
pub mod regular;

pub use explicit::ExplicitDecomposition;
pub use rank::{NoComm, RankInfo, RankSource};
pub use regular::{ProcGrid, RegularDecomposition};

/// A rank's view of a decomposed index space.
pub trait IndexDecomposition {
    /// Number of entries in the whole domain.
    fn global_count(&self) -> usize;

    /// Number of entries owned by this rank.
    fn local_count(&self) -> usize;

    /// Local index of `global`, or a value `>= local_count()` if this rank
    /// does not own it (including indices outside the domain).
    fn global_to_local(&self, global: usize) -> usize;

    /// Global index of the `local`-th owned entry.
    fn local_to_global(&self, local: usize) -> Option<usize>;

    /// [`global_to_local`](Self::global_to_local) with the sentinel turned
    /// into `None`.
    fn try_global_to_local(&self, global: usize) -> Option<usize> {
        let local = self.global_to_local(global);
        (local < self.local_count()).then_some(local)
    }

    fn is_local(&self, global: usize) -> bool {
        self.global_to_local(global) < self.local_count()
    }

    /// Global indices of the owned entries, in local order.
    fn owned_globals(&self) -> impl Iterator<Item = usize> + '_
    where
        Self: Sized,
    {
        (0..self.local_count()).filter_map(move |l| self.local_to_global(l))
    }
}
