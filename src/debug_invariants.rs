//! Structural self-checks for containers and registers.
//!
//! Each structure with an internal invariant (sorted keys, heap order, list
//! links, the register's name index) implements [`DebugInvariants`] and calls
//! [`debug_invariants!`](crate::debug_invariants) after mutating itself. The
//! checks compile away in release builds unless `check-invariants` or
//! `strict-invariants` is enabled.

use crate::stg_error::StgError;

/// Trait for validating container and registry invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), StgError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "[invariants] Set::insert: Invariant violated in Set: out of order")]
    fn failed_check_panics_with_context() {
        let check: Result<(), StgError> = Err(StgError::invariant("Set", "out of order"));
        crate::debug_invariants!(check, "Set::insert");
    }

    #[test]
    fn passing_check_is_silent() {
        let check: Result<(), StgError> = Ok(());
        crate::debug_invariants!(check, "Set::insert");
    }
}
