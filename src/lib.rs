#![cfg_attr(docsrs, feature(doc_cfg))]
//! # stg-core
//!
//! stg-core is the component and indexing core of a StGermain-style
//! simulation framework. A simulation is assembled at run time from
//! pluggable components named in configuration, then run across a
//! domain-decomposed mesh, one process per rank.
//!
//! ## Features
//! - A hierarchical configuration [`Dictionary`](dictionary::Dictionary) with typed,
//!   coercing getters, dotted paths and serde loading
//! - A component repository resolving `(category, type)` names to constructors,
//!   with plugins, lazy dependency resolution and cycle detection
//! - A named object register with stable indices
//! - Container primitives (arrays, sorted sets and maps, pointer sets, linked
//!   lists, max-heaps) with explicit deep and shallow copies
//! - Global ↔ local mesh index mapping for regular and explicit decompositions,
//!   with optional MPI rank discovery
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! stg-core = "0.1"
//! # Optional features:
//! # features = ["mpi-support", "check-invariants"]
//! ```
//!
//! ## Errors
//! Every fallible operation returns [`StgError`]. Lookup misses are `None`,
//! not errors. Drivers turn fatal errors into an abort through
//! [`Firewall`](firewall::Firewall).
//!
//! ## Invariant checks
//! Containers and registers validate their invariants after mutation in debug
//! builds, or in release builds with the `check-invariants` feature. See
//! [`DebugInvariants`].

pub mod container;
pub mod context;
pub mod debug_invariants;
pub mod decomp;
pub mod dictionary;
pub mod firewall;
pub mod registry;
pub mod stg_error;

pub use debug_invariants::DebugInvariants;
pub use stg_error::StgError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::container::{
        Array, Comparator, Container, LinkedList, Map, MaxHeap, NaturalOrder, PtrSet, Set,
        SetAlgebra, Shallow, UIntMap,
    };
    pub use crate::context::Context;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::decomp::{
        ExplicitDecomposition, IndexDecomposition, NoComm, ProcGrid, RankSource,
        RegularDecomposition,
    };
    pub use crate::dictionary::{Dictionary, MergePolicy, Value};
    pub use crate::firewall::Firewall;
    pub use crate::registry::{
        BuildContext, Component, ComponentFactory, ComponentHandle, ComponentRegister,
        ComponentRepository, NamedObject, NamedObjectRegister, Plugin, Shared, StaticPlugin,
    };
    pub use crate::stg_error::StgError;
}
