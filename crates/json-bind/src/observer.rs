//! Observers and the change records they receive.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::Model;
use json_bind_path::Path;

/// What happened at the mutated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Set,
    Delete,
}

/// Snapshot handed to an observer registered at one prefix of a mutated
/// path.
///
/// `value` is the current value at that prefix, read after the mutation was
/// applied: observers of an ancestor see the whole current subtree, not a
/// diff.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    /// Value at `path[..index]`, `None` if absent.
    pub value: Option<Value>,
    /// The full mutated path.
    pub path: Path,
    /// Length of the prefix the observer is registered at.
    pub index: usize,
    /// Container holding `value`, `None` at the root prefix.
    pub parent: Option<Value>,
}

impl ChangeRecord {
    /// The prefix the receiving observer is registered at.
    pub fn prefix(&self) -> Path {
        self.path.prefix(self.index)
    }

    /// Last segment of the prefix.
    pub fn key(&self) -> Option<&str> {
        match self.index {
            0 => None,
            index => self.path.get(index - 1),
        }
    }

    /// True when the observer sits exactly at the mutated path.
    pub fn is_exact(&self) -> bool {
        self.index == self.path.len()
    }
}

pub type Callback = Rc<dyn Fn(&Model, &ChangeRecord)>;

/// Something outside the model that wants "model changed, please refresh"
/// deliveries, typically a UI control adapter.
pub trait ExternalTarget {
    fn update(&self, model: &Model, record: &ChangeRecord);
}

/// A registered observer.
#[derive(Clone)]
pub enum Observer {
    Callback(Callback),
    /// `handle` identifies the external target; deliveries go to `notify`
    /// when given, to `handle` otherwise.
    External {
        handle: Rc<dyn ExternalTarget>,
        notify: Option<Rc<dyn ExternalTarget>>,
    },
}

impl Observer {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Model, &ChangeRecord) + 'static,
    {
        Observer::Callback(Rc::new(f))
    }

    pub fn external(handle: Rc<dyn ExternalTarget>) -> Self {
        Observer::External {
            handle,
            notify: None,
        }
    }

    pub fn external_via(handle: Rc<dyn ExternalTarget>, notify: Rc<dyn ExternalTarget>) -> Self {
        Observer::External {
            handle,
            notify: Some(notify),
        }
    }

    /// True for an external observer whose handle is `source`.
    pub fn is_source(&self, source: Option<&Rc<dyn ExternalTarget>>) -> bool {
        match (self, source) {
            (Observer::External { handle, .. }, Some(source)) => Rc::ptr_eq(handle, source),
            _ => false,
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observer::Callback(_) => f.write_str("Callback(..)"),
            Observer::External { notify, .. } => f
                .debug_struct("External")
                .field("notify", &notify.is_some())
                .finish_non_exhaustive(),
        }
    }
}

/// The observer registered when a path is bound without one.
///
/// Deliveries only raise a pending flag, which the host can poll.
#[derive(Debug)]
pub struct PathTarget {
    path: Path,
    pending: Cell<bool>,
    deliveries: Cell<usize>,
}

impl PathTarget {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            pending: Cell::new(false),
            deliveries: Cell::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn deliveries(&self) -> usize {
        self.deliveries.get()
    }

    /// Returns whether an update arrived since the last call, and clears it.
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }
}

impl ExternalTarget for PathTarget {
    fn update(&self, _model: &Model, _record: &ChangeRecord) {
        self.pending.set(true);
        self.deliveries.set(self.deliveries.get() + 1);
    }
}
