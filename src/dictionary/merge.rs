//! Merging one dictionary into another, as done when several configuration
//! files are layered on top of each other.

use super::{Dictionary, Value};

/// How an incoming entry combines with an existing entry of the same key.
///
/// Keys absent from the target are always appended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The incoming value replaces the existing one.
    #[default]
    Replace,
    /// The existing value becomes (or stays) a list and the incoming
    /// value's elements are appended to it.
    Append,
    /// Structs merge recursively; any other pair is replaced.
    Merge,
}

impl Dictionary {
    /// Merge `other` into `self` under `policy`.
    pub fn merge(&mut self, other: Dictionary, policy: MergePolicy) {
        for (key, incoming) in other.entries {
            let Some(existing) = self.get_mut(&key) else {
                self.entries.push((key, incoming));
                continue;
            };
            match policy {
                MergePolicy::Replace => *existing = incoming,
                MergePolicy::Append => append_value(existing, incoming),
                MergePolicy::Merge => merge_value(existing, incoming),
            }
        }
    }
}

fn append_value(existing: &mut Value, incoming: Value) {
    if !matches!(existing, Value::List(_)) {
        let first = std::mem::replace(existing, Value::List(Vec::new()));
        if let Value::List(items) = existing {
            items.push(first);
        }
    }
    if let Value::List(items) = existing {
        match incoming {
            Value::List(more) => items.extend(more),
            single => items.push(single),
        }
    }
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Struct(dst), Value::Struct(src)) => dst.merge(src, MergePolicy::Merge),
        (slot, other) => *slot = other,
    }
}
