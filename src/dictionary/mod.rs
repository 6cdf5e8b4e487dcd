//! Dictionary: the ordered, hierarchical key/value store that configures
//! every component.
//!
//! A [`Dictionary`] keeps its entries in insertion order and holds at most
//! one entry per key. Values are tagged ([`Value`]) and may nest further
//! dictionaries (`Struct`) or sequences (`List`).
//!
//! Lookups come in three flavours:
//! - [`Dictionary::get`] and the typed `get_*` getters treat a missing key as
//!   a configuration error ([`StgError::MissingKey`]).
//! - [`Dictionary::get_opt`] reports a miss as `None`.
//! - [`Dictionary::get_with_default`] and the `get_*_or` getters never fail.

mod merge;
mod serde_impl;
mod value;

use std::fmt;

pub use merge::MergePolicy;
pub use value::Value;

use crate::stg_error::StgError;

/// Ordered key/value configuration store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, Value)>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Insert `value` under `key`, or overwrite the existing entry in place.
    ///
    /// An overwritten entry keeps its position; the previous value is returned.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.position(key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Look up `key`; a miss is a configuration error.
    pub fn get(&self, key: &str) -> Result<&Value, StgError> {
        self.get_opt(key)
            .ok_or_else(|| StgError::MissingKey(key.to_string()))
    }

    pub fn get_opt(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up `key`, falling back to `default` on a miss.
    pub fn get_with_default(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.get_opt(key) {
            Some(v) => v.clone(),
            None => default.into(),
        }
    }

    /// Entry at `index` in insertion order.
    pub fn entry_at(&self, index: usize) -> Option<(&str, &Value)> {
        self.entries.get(index).map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> + '_ {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    // ---------------------------------------------------------------------
    // Typed getters
    // ---------------------------------------------------------------------

    pub fn get_double(&self, key: &str) -> Result<f64, StgError> {
        self.get(key)?.as_double(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i32, StgError> {
        self.get(key)?.as_int(key)
    }

    pub fn get_uint(&self, key: &str) -> Result<u32, StgError> {
        self.get(key)?.as_uint(key)
    }

    pub fn get_ulong(&self, key: &str) -> Result<u64, StgError> {
        self.get(key)?.as_ulong(key)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, StgError> {
        self.get(key)?.as_bool(key)
    }

    pub fn get_string(&self, key: &str) -> Result<String, StgError> {
        self.get(key)?.as_string(key)
    }

    /// Nested dictionary under `key`.
    pub fn get_struct(&self, key: &str) -> Result<&Dictionary, StgError> {
        self.get(key)?
            .as_struct()
            .ok_or_else(|| StgError::NotAStruct(key.to_string()))
    }

    /// List under `key`.
    pub fn get_list(&self, key: &str) -> Result<&[Value], StgError> {
        self.get(key)?
            .as_list()
            .ok_or_else(|| StgError::NotAList(key.to_string()))
    }

    pub fn get_double_or(&self, key: &str, default: f64) -> f64 {
        self.get_double(key).unwrap_or(default)
    }

    pub fn get_int_or(&self, key: &str, default: i32) -> i32 {
        self.get_int(key).unwrap_or(default)
    }

    pub fn get_uint_or(&self, key: &str, default: u32) -> u32 {
        self.get_uint(key).unwrap_or(default)
    }

    pub fn get_ulong_or(&self, key: &str, default: u64) -> u64 {
        self.get_ulong(key).unwrap_or(default)
    }

    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .unwrap_or_else(|_| default.to_string())
    }

    // ---------------------------------------------------------------------
    // Path access
    // ---------------------------------------------------------------------

    /// Follow a dotted path such as `"mesh.size.0"`. Numeric segments index
    /// lists; every other segment names a struct member.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut cur = self.get_opt(segments.next()?)?;
        for seg in segments {
            cur = match cur {
                Value::Struct(d) => d.get_opt(seg)?,
                Value::List(items) => items.get(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn get_path_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut cur = self.get_mut(segments.next()?)?;
        for seg in segments {
            cur = match cur {
                Value::Struct(d) => d.get_mut(seg)?,
                Value::List(items) => items.get_mut(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Set the value at a dotted path. The parent of the final segment must
    /// exist; a struct parent gains the member if absent, a list parent must
    /// already have the indexed element.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Result<(), StgError> {
        let invalid = |segment: &str| StgError::InvalidPath {
            path: path.to_string(),
            segment: segment.to_string(),
        };
        let (parent, last) = match path.rsplit_once('.') {
            Some(split) => split,
            None => {
                self.add(path, value);
                return Ok(());
            }
        };
        let parent_value = self.get_path_mut(parent).ok_or_else(|| invalid(parent))?;
        match parent_value {
            Value::Struct(d) => {
                d.add(last, value);
                Ok(())
            }
            Value::List(items) => {
                let slot = last
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or_else(|| invalid(last))?;
                *slot = value.into();
                Ok(())
            }
            _ => Err(invalid(last)),
        }
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.add(k, v);
        }
        dict
    }
}
