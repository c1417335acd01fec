//! The flat key-value context threaded through the pipeline

use crate::Value;
use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter, IterMut};
use serde::{Deserialize, Serialize};

/// Ordered mapping from dotted keys (`a.b.c`) to values.
///
/// Keys are case-sensitive and unique. Insertion order is preserved, which is
/// the order every stage iterates in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flat context from a hierarchical table.
    pub fn from_table(table: IndexMap<String, Value>) -> Self {
        Self { entries: table }.flatten()
    }

    /// Decompose every top-level table into dotted entries.
    ///
    /// Already-flat contexts are returned unchanged. When two paths collapse
    /// onto the same dotted key, the one encountered last wins. Empty tables
    /// produce no key.
    pub fn flatten(self) -> Self {
        if !self.entries.values().any(|v| matches!(v, Value::Table(_))) {
            return self;
        }

        let mut flat = IndexMap::with_capacity(self.entries.len());
        for (key, value) in self.entries {
            flatten_into(&mut flat, key, value);
        }
        Self { entries: flat }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Insert only when the key is absent. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }
}

fn flatten_into(flat: &mut IndexMap<String, Value>, key: String, value: Value) {
    match value {
        Value::Table(table) => {
            for (child, item) in table {
                flatten_into(flat, format!("{key}.{child}"), item);
            }
        }
        other => {
            flat.insert(key, other);
        }
    }
}

impl<'a> IntoIterator for &'a Context {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Context {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
