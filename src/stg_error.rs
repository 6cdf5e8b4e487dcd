//! StgError: unified error type for the stg-core public APIs.
//!
//! Configuration errors and invariant violations are the "firewall" class:
//! callers are expected to abort the run on them (see [`crate::firewall`]).
//! Lookup misses are never errors; they are reported as `None`.

use thiserror::Error;

/// Unified error type for stg-core operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StgError {
    /// A required dictionary key was absent.
    #[error("Dictionary key `{0}` not found")]
    MissingKey(String),
    /// A dictionary value could not be coerced to the requested kind.
    #[error("Dictionary value for `{key}` is {found}, cannot be read as {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },
    /// A struct operation was applied to a non-struct value.
    #[error("Dictionary value `{0}` is not a struct")]
    NotAStruct(String),
    /// A list operation was applied to a non-list value.
    #[error("Dictionary value `{0}` is not a list")]
    NotAList(String),
    /// A dotted dictionary path could not be followed.
    #[error("Dictionary path `{path}` is invalid at segment `{segment}`")]
    InvalidPath { path: String, segment: String },

    /// A factory for this (category, type) pair is already registered.
    #[error("Component factory {category}/{type_name} is already registered")]
    DuplicateFactory { category: String, type_name: String },
    /// No factory matches the requested (category, type) pair.
    #[error("No component factory registered for {category}/{type_name}")]
    UnknownComponent { category: String, type_name: String },
    /// A plugin named in the configuration is not available.
    #[error("Plugin `{0}` is not available")]
    UnknownPlugin(String),
    /// An object with this name is already in the register.
    #[error("An object named `{0}` is already registered")]
    DuplicateName(String),
    /// No object with this name is in the register.
    #[error("No registered object named `{0}`")]
    UnknownObject(String),
    /// A component was referenced but has no entry in the `components` struct.
    #[error("Component `{0}` has no configuration entry")]
    MissingComponentConfig(String),
    /// Building a component required itself (directly or transitively).
    #[error("Cyclic component dependency: {0}")]
    CyclicDependency(String),
    /// A component exists but is not of the requested concrete type.
    #[error("Component `{name}` is not a `{expected}`")]
    ComponentDowncast { name: String, expected: &'static str },

    /// Decomposition parameters are inconsistent.
    #[error("Invalid decomposition: {0}")]
    InvalidDecomposition(String),
    /// An (i,j,k) triple or global index lies outside the global domain.
    #[error("Index {index} lies outside a domain of {count} entries")]
    IndexOutOfDomain { index: usize, count: usize },

    /// A data-structure invariant does not hold.
    #[error("Invariant violated in {structure}: {detail}")]
    Invariant {
        structure: &'static str,
        detail: String,
    },
}

impl StgError {
    /// Whether this error belongs to the fatal (firewall) class.
    ///
    /// Configuration errors and invariant violations are fatal; the remaining
    /// variants describe conditions a caller may reasonably recover from.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            StgError::TypeMismatch { .. }
                | StgError::UnknownObject(_)
                | StgError::ComponentDowncast { .. }
                | StgError::IndexOutOfDomain { .. }
        )
    }

    pub(crate) fn invariant(structure: &'static str, detail: impl Into<String>) -> Self {
        StgError::Invariant {
            structure,
            detail: detail.into(),
        }
    }
}
