//! NamedObjectRegister: insertion-ordered lookup of objects by name.
//!
//! The register is append-only. An object's index is fixed when it is added
//! and stays valid for the register's lifetime, so callers may cache indices.

use hashbrown::HashMap;

use crate::debug_invariants::DebugInvariants;
use crate::stg_error::StgError;

/// Anything that knows its own name.
pub trait NamedObject {
    fn name(&self) -> &str;
}

/// Insertion-ordered register of named objects.
///
/// # Invariants
/// - Names are unique (exact, case-sensitive comparison).
/// - `index[name] == i` iff `entries[i].0 == name`.
#[derive(Clone, Debug)]
pub struct NamedObjectRegister<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for NamedObjectRegister<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> NamedObjectRegister<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` under its own name.
    pub fn add(&mut self, object: T) -> Result<usize, StgError>
    where
        T: NamedObject,
    {
        let name = object.name().to_string();
        self.add_named(name, object)
    }

    /// Add `object` under `name`, returning its stable index.
    ///
    /// # Errors
    /// [`StgError::DuplicateName`] if `name` is already registered.
    pub fn add_named(&mut self, name: impl Into<String>, object: T) -> Result<usize, StgError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(StgError::DuplicateName(name));
        }
        let idx = self.entries.len();
        self.index.insert(name.clone(), idx);
        self.entries.push((name, object));
        crate::debug_invariants!(self.validate_invariants(), "NamedObjectRegister::add");
        Ok(idx)
    }

    /// Index of the object called `name`.
    pub fn get_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.get_index(name).map(|i| &self.entries[i].1)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut T> {
        let idx = self.get_index(name)?;
        Some(&mut self.entries[idx].1)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, obj)| obj)
    }

    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|(_, obj)| obj)
    }

    /// Name registered at `index`.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(name, object)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(name, obj)| (name.as_str(), obj))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> + '_ {
        self.entries.iter_mut().map(|(name, obj)| (name.as_str(), obj))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<T> DebugInvariants for NamedObjectRegister<T> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "NamedObjectRegister invalid");
    }

    fn validate_invariants(&self) -> Result<(), StgError> {
        if self.index.len() != self.entries.len() {
            return Err(StgError::invariant(
                "NamedObjectRegister",
                format!(
                    "{} index entries for {} objects",
                    self.index.len(),
                    self.entries.len()
                ),
            ));
        }
        for (i, (name, _)) in self.entries.iter().enumerate() {
            if self.index.get(name) != Some(&i) {
                return Err(StgError::invariant(
                    "NamedObjectRegister",
                    format!("`{name}` is not indexed at {i}"),
                ));
            }
        }
        Ok(())
    }
}
