//! Binding registry: canonical path string → observers.

use std::collections::BTreeMap;

use crate::observer::Observer;
use json_bind_path::Path;

/// Observers keyed by the canonical string of the exact path they were
/// bound to. Prefix matching is the dispatcher's job.
#[derive(Debug, Default, Clone)]
pub struct BindingRegistry {
    entries: BTreeMap<String, Vec<Observer>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observer` to the list at `path`. Repeated binds accumulate.
    pub fn bind(&mut self, path: &Path, observer: Observer) {
        self.entries
            .entry(path.canonical())
            .or_default()
            .push(observer);
    }

    /// Drop every observer at exactly `path`. Returns the removed list.
    pub fn unbind(&mut self, path: &Path) -> Option<Vec<Observer>> {
        self.entries.remove(&path.canonical())
    }

    pub fn lookup(&self, path: &Path) -> Option<&[Observer]> {
        self.lookup_key(&path.canonical())
    }

    pub fn lookup_key(&self, key: &str) -> Option<&[Observer]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of bound paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
