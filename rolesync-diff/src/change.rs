//! Change processing - diffs two keyed collections into add/remove operations.
//!
//! The external API has no "replace set" verb, so every relationship update
//! is expressed as the minimal set of per-item adds and removes. Items whose
//! key appears on both sides are treated as unchanged even if their non-key
//! fields differ.
//!
//! Output order is deterministic: all removes first, then all adds, each in
//! ascending key order.

use crate::error::{CollectionSide, DiffResult, ExtractionError};
use crate::keyed::KeyedItem;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The kind of mutation an operation performs on a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OpKind {
    Add,
    Remove,
}

impl OpKind {
    /// Returns the wire representation (`ADD` / `REMOVE`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "ADD",
            OpKind::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload tagged with the mutation it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<P> {
    pub kind: OpKind,
    pub payload: P,
}

impl<P> Operation<P> {
    /// Creates an add operation.
    pub fn add(payload: P) -> Self {
        Self {
            kind: OpKind::Add,
            payload,
        }
    }

    /// Creates a remove operation.
    pub fn remove(payload: P) -> Self {
        Self {
            kind: OpKind::Remove,
            payload,
        }
    }

    /// Maps the payload, keeping the kind.
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> Operation<Q> {
        Operation {
            kind: self.kind,
            payload: f(self.payload),
        }
    }
}

/// The result of diffing an old collection against a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<T> {
    /// Items whose key is in `new` but not in `old`.
    pub to_add: Vec<T>,
    /// Items whose key is in `old` but not in `new`.
    pub to_remove: Vec<T>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_remove: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    /// Returns true if there is nothing to add or remove.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Total number of operations this change set expands to.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Expands the change set into tagged operations, removes first.
    pub fn into_operations<P>(self, mut build: impl FnMut(&T, OpKind) -> P) -> Vec<Operation<P>> {
        let mut ops = Vec::with_capacity(self.len());
        for item in &self.to_remove {
            ops.push(Operation::remove(build(item, OpKind::Remove)));
        }
        for item in &self.to_add {
            ops.push(Operation::add(build(item, OpKind::Add)));
        }
        ops
    }
}

impl<T: KeyedItem + Clone> ChangeSet<T> {
    /// Diffs two collections using the items' own keys.
    pub fn between(old: &[T], new: &[T]) -> Self {
        diff_by(old, new, T::key)
    }
}

/// Diffs two collections using a caller-supplied key function.
pub fn diff_by<T, K>(old: &[T], new: &[T], key_of: impl Fn(&T) -> K) -> ChangeSet<T>
where
    T: Clone,
    K: Ord,
{
    let old_index = index_by(old, &key_of);
    let new_index = index_by(new, &key_of);

    let to_remove = old_index
        .iter()
        .filter(|(key, _)| !new_index.contains_key(*key))
        .map(|(_, item)| (*item).clone())
        .collect();

    let to_add = new_index
        .iter()
        .filter(|(key, _)| !old_index.contains_key(*key))
        .map(|(_, item)| (*item).clone())
        .collect();

    ChangeSet { to_add, to_remove }
}

// Later duplicates of a key overwrite earlier ones.
fn index_by<'a, T, K: Ord>(items: &'a [T], key_of: &impl Fn(&T) -> K) -> BTreeMap<K, &'a T> {
    items.iter().map(|item| (key_of(item), item)).collect()
}

/// Decodes a raw JSON collection into items. Absent or `null` is empty.
pub fn extract_items<T: DeserializeOwned>(
    value: Option<&Value>,
    side: CollectionSide,
) -> DiffResult<Vec<T>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(elements)) => elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                T::deserialize(element).map_err(|source| ExtractionError::Malformed {
                    side,
                    index,
                    source,
                })
            })
            .collect(),
        Some(other) => Err(ExtractionError::NotAList {
            side,
            found: json_kind(other),
        }),
    }
}

/// Decodes both collections, diffs them and builds one payload per change.
///
/// Fails without emitting anything if either side is malformed.
pub fn process_changes<T, K, P>(
    old: Option<&Value>,
    new: Option<&Value>,
    key_of: impl Fn(&T) -> K,
    build_payload: impl FnMut(&T, OpKind) -> P,
) -> DiffResult<Vec<Operation<P>>>
where
    T: DeserializeOwned + Clone,
    K: Ord,
{
    let old_items: Vec<T> = extract_items(old, CollectionSide::Old)?;
    let new_items: Vec<T> = extract_items(new, CollectionSide::New)?;
    Ok(diff_by(&old_items, &new_items, key_of).into_operations(build_payload))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
