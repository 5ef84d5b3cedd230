//! The hierarchical value store.
//!
//! A single [`serde_json::Value`] tree addressed by [`Path`]. Containers are
//! lists (`Value::Array`) or maps (`Value::Object`); missing intermediate
//! containers are materialized on write only, their kind chosen by
//! [`decide_kind`] from the segment that follows them.

use serde_json::{Map, Value};

use json_bind_path::{parse_index, Path};

/// How far past its end a list may be extended by one write.
///
/// An index further out is stored as a map key instead of padding the list
/// with `null`s.
pub const MAX_LIST_PADDING: usize = 1024;

/// Kind of container materialized for a missing intermediate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Map,
}

impl ContainerKind {
    pub fn empty(self) -> Value {
        match self {
            ContainerKind::List => Value::Array(Vec::new()),
            ContainerKind::Map => Value::Object(Map::new()),
        }
    }

    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Array(_) => Some(ContainerKind::List),
            Value::Object(_) => Some(ContainerKind::Map),
            _ => None,
        }
    }
}

/// Choose the container kind for a position whose next segment is
/// `next_segment`.
///
/// Indices beyond [`MAX_LIST_PADDING`] get a map, like any other key.
///
/// ```
/// use json_bind::store::{decide_kind, ContainerKind};
///
/// assert_eq!(decide_kind("0", true), ContainerKind::List);
/// assert_eq!(decide_kind("0", false), ContainerKind::Map);
/// assert_eq!(decide_kind("name", true), ContainerKind::Map);
/// assert_eq!(decide_kind("4000000000", true), ContainerKind::Map);
/// ```
pub fn decide_kind(next_segment: &str, create_arrays: bool) -> ContainerKind {
    match parse_index(next_segment) {
        Some(index) if create_arrays && index <= MAX_LIST_PADDING => ContainerKind::List,
        _ => ContainerKind::Map,
    }
}

/// Result of [`ModelStore::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Changed,
    Unchanged,
}

/// Result of a delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The parent container existed. Holds the removed value, `None` if the
    /// terminal key itself was missing.
    Deleted(Option<Value>),
    /// An intermediate container was missing, nothing happened.
    Absent,
}

impl DeleteOutcome {
    pub fn previous(&self) -> Option<&Value> {
        match self {
            DeleteOutcome::Deleted(previous) => previous.as_ref(),
            DeleteOutcome::Absent => None,
        }
    }

    pub fn into_previous(self) -> Option<Value> {
        match self {
            DeleteOutcome::Deleted(previous) => previous,
            DeleteOutcome::Absent => None,
        }
    }
}

/// The value tree. Starts as an empty map.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStore {
    root: Value,
    create_arrays: bool,
}

impl ModelStore {
    pub fn new(create_arrays: bool) -> Self {
        Self {
            root: Value::Object(Map::new()),
            create_arrays,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Visit every position of `path`, descending from the root.
    ///
    /// The visitor receives the path, the position and the container about
    /// to be descended into. Returns the value at the full path.
    pub fn walk<F>(&self, path: &Path, mut visitor: F) -> Option<&Value>
    where
        F: FnMut(&Path, usize, &Value),
    {
        let mut current = &self.root;
        for index in 0..path.len() {
            visitor(path, index, current);
            current = child(current, &path[index])?;
        }
        Some(current)
    }

    /// Mutable variant of [`walk`](Self::walk); the visitor may reshape the
    /// current container before the walk descends into it.
    pub fn walk_mut<F>(&mut self, path: &Path, mut visitor: F) -> Option<&mut Value>
    where
        F: FnMut(&Path, usize, &mut Value),
    {
        let mut current = &mut self.root;
        for index in 0..path.len() {
            visitor(path, index, current);
            current = child_mut(current, &path[index])?;
        }
        Some(current)
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        self.walk(path, |_, _, _| {})
    }

    /// Write `value` at `path`, materializing missing containers on the way.
    ///
    /// Returns [`SetOutcome::Unchanged`] when the current value is
    /// structurally equal to `value`. A missing value always counts as a
    /// change, even when `value` is `null`.
    pub fn set(&mut self, path: &Path, value: Value) -> SetOutcome {
        let Some(key) = path.last() else {
            if self.root == value {
                return SetOutcome::Unchanged;
            }
            self.root = value;
            return SetOutcome::Changed;
        };

        let create_arrays = self.create_arrays;
        if ContainerKind::of(&self.root).is_none() {
            self.root = decide_kind(&path[0], create_arrays).empty();
        }
        let parent_path = path.prefix(path.len() - 1);
        let parent = self.walk_mut(&parent_path, |_, index, container| {
            let kind = decide_kind(&path[index + 1], create_arrays);
            let slot = slot_mut(container, &path[index]);
            if ContainerKind::of(slot).is_none() {
                *slot = kind.empty();
            }
        });
        let Some(parent) = parent else {
            return SetOutcome::Unchanged;
        };

        if child(parent, key) == Some(&value) {
            return SetOutcome::Unchanged;
        }
        *slot_mut(parent, key) = value;
        SetOutcome::Changed
    }

    /// Remove the value at `path` without materializing anything.
    ///
    /// List elements are removed with the following elements shifting down.
    /// Deleting the root resets the store to an empty map.
    pub fn delete(&mut self, path: &Path) -> DeleteOutcome {
        let Some(key) = path.last() else {
            let previous = std::mem::replace(&mut self.root, Value::Object(Map::new()));
            return DeleteOutcome::Deleted(Some(previous));
        };

        let parent_path = path.prefix(path.len() - 1);
        match self.walk_mut(&parent_path, |_, _, _| {}) {
            Some(Value::Array(items)) => {
                let previous = parse_index(key)
                    .filter(|&index| index < items.len())
                    .map(|index| items.remove(index));
                DeleteOutcome::Deleted(previous)
            }
            Some(Value::Object(map)) => DeleteOutcome::Deleted(map.shift_remove(key)),
            _ => DeleteOutcome::Absent,
        }
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Deep-merge `defaults` beneath `current`.
///
/// Existing values win; defaults only fill missing keys, recursively for
/// nested maps.
///
/// ```
/// use json_bind::store::merge_defaults;
/// use serde_json::json;
///
/// let current = json!({"a": 1, "nested": {"x": true}});
/// let merged = merge_defaults(Some(&current), &json!({"a": 2, "b": 3, "nested": {"y": false}}));
/// assert_eq!(merged, json!({"a": 1, "nested": {"x": true, "y": false}, "b": 3}));
/// ```
pub fn merge_defaults(current: Option<&Value>, defaults: &Value) -> Value {
    match (current, defaults) {
        (None, defaults) => defaults.clone(),
        (Some(Value::Object(current)), Value::Object(defaults)) => {
            let mut merged = current.clone();
            for (key, default) in defaults {
                let value = merge_defaults(current.get(key), default);
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (Some(current), _) => current.clone(),
    }
}

fn child<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    match container {
        Value::Array(items) => items.get(parse_index(segment)?),
        Value::Object(map) => map.get(segment),
        _ => None,
    }
}

fn child_mut<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match container {
        Value::Array(items) => items.get_mut(parse_index(segment)?),
        Value::Object(map) => map.get_mut(segment),
        _ => None,
    }
}

/// The slot for `segment` inside `container`, created as `null` if missing.
///
/// Lists grow with `null` padding up to an index at most
/// [`MAX_LIST_PADDING`] past their end. Any other segment turns a list into
/// a map keyed by the former indices, and a scalar container is replaced by
/// an empty map.
fn slot_mut<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match (&*container, parse_index(segment)) {
        (Value::Array(items), Some(index))
            if index <= items.len().saturating_add(MAX_LIST_PADDING) =>
        {
            Some(index)
        }
        _ => None,
    };
    let keeps_list = index.is_some();
    if !keeps_list && !container.is_object() {
        let previous = std::mem::take(container);
        *container = Value::Object(into_map(previous));
    }
    match container {
        Value::Array(items) => {
            let index = index.unwrap_or(items.len());
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        Value::Object(map) => map.entry(segment).or_insert(Value::Null),
        other => other,
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
