//! Decomposition given by an explicit list of owned global indices.
//!
//! Used when ownership does not follow a regular block layout, e.g. after
//! an external partitioner has run. Local order is the order the indices
//! were supplied in.

use super::IndexDecomposition;
use crate::container::{Container, UIntMap};
use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Owned set listed explicitly, with a `global → local` [`UIntMap`].
///
/// # Invariants
/// - Every owned index is `< global_count`.
/// - `map[owned[l]] == l` for every local index `l`, and `map` holds
///   nothing else.
#[derive(Clone, Debug)]
pub struct ExplicitDecomposition {
    global_count: usize,
    owned: Vec<u32>,
    map: UIntMap,
}

impl ExplicitDecomposition {
    /// # Errors
    /// [`StgError::InvalidDecomposition`] if an index is repeated, lies
    /// outside `0..global_count`, or does not fit in `u32`.
    pub fn new(
        global_count: usize,
        owned: impl IntoIterator<Item = usize>,
    ) -> Result<Self, StgError> {
        let mut decomp = Self {
            global_count,
            owned: Vec::new(),
            map: UIntMap::new(),
        };
        for global in owned {
            if global >= global_count {
                return Err(StgError::InvalidDecomposition(format!(
                    "owned index {global} outside a domain of {global_count}"
                )));
            }
            let key = u32::try_from(global).map_err(|_| {
                StgError::InvalidDecomposition(format!("owned index {global} exceeds u32"))
            })?;
            let local = u32::try_from(decomp.owned.len()).map_err(|_| {
                StgError::InvalidDecomposition("more than u32::MAX owned entries".into())
            })?;
            if decomp.map.insert(key, local).is_some() {
                return Err(StgError::InvalidDecomposition(format!(
                    "owned index {global} listed twice"
                )));
            }
            decomp.owned.push(key);
        }
        crate::debug_invariants!(decomp.validate_invariants(), "ExplicitDecomposition::new");
        Ok(decomp)
    }

    /// Snapshot of any other decomposition's owned set.
    pub fn from_decomposition<D: IndexDecomposition>(other: &D) -> Result<Self, StgError> {
        Self::new(other.global_count(), other.owned_globals())
    }

    /// Owned global indices, in local order.
    pub fn owned(&self) -> &[u32] {
        &self.owned
    }
}

impl IndexDecomposition for ExplicitDecomposition {
    fn global_count(&self) -> usize {
        self.global_count
    }

    fn local_count(&self) -> usize {
        self.owned.len()
    }

    fn global_to_local(&self, global: usize) -> usize {
        u32::try_from(global)
            .ok()
            .and_then(|g| self.map.get(g))
            .map_or(self.owned.len(), |l| l as usize)
    }

    fn local_to_global(&self, local: usize) -> Option<usize> {
        self.owned.get(local).map(|&g| g as usize)
    }
}

impl DebugInvariants for ExplicitDecomposition {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ExplicitDecomposition invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if self.map.len() != self.owned.len() {
            return Err(StgError::invariant(
                "ExplicitDecomposition",
                format!("{} mapped for {} owned", self.map.len(), self.owned.len()),
            ));
        }
        for (local, &global) in self.owned.iter().enumerate() {
            if global as usize >= self.global_count {
                return Err(StgError::invariant(
                    "ExplicitDecomposition",
                    format!("owned {global} outside {}", self.global_count),
                ));
            }
            if self.map.get(global).map(|l| l as usize) != Some(local) {
                return Err(StgError::invariant(
                    "ExplicitDecomposition",
                    format!("{global} does not map back to {local}"),
                ));
            }
        }
        Ok(())
    }
}
