//! The [`Model`] service object.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::BindConfig;
use crate::control::{Control, ControlBinding};
use crate::observer::{ChangeKind, ChangeRecord, ExternalTarget, Observer, PathTarget};
use crate::registry::BindingRegistry;
use crate::store::{merge_defaults, DeleteOutcome, ModelStore, SetOutcome};
use crate::template::{self, Transform};
use json_bind_path::{Path, PathResolver, Reference};

/// A value tree with path bindings.
///
/// Owns the store, the binding registry and the resolver with its default
/// context. Everything runs synchronously on the calling thread: a `set` or
/// `delete` returns only after every matching observer ran. Observers get
/// `&Model` and may read, write, bind and unbind re-entrantly; an observer
/// that unconditionally rewrites what it was notified about loops forever.
///
/// Operations taking a reference resolve it first; an unresolvable
/// reference turns the operation into a no-op.
pub struct Model {
    config: BindConfig,
    store: RefCell<ModelStore>,
    registry: RefCell<BindingRegistry>,
    resolver: RefCell<PathResolver>,
}

impl Model {
    pub fn new() -> Self {
        Self::with_config(BindConfig::default())
    }

    pub fn with_config(config: BindConfig) -> Self {
        Self {
            store: RefCell::new(ModelStore::new(config.create_arrays)),
            registry: RefCell::new(BindingRegistry::new()),
            resolver: RefCell::new(PathResolver::with_scope_attribute(
                config.scope_attribute.clone(),
            )),
            config,
        }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    // ── Resolution ──────────────────────────────────────────────────────

    pub fn resolve<'r>(&self, reference: impl Into<Reference<'r>>) -> Option<Path> {
        self.resolve_in(reference, None)
    }

    /// Resolve `reference` against `context` instead of the default
    /// context.
    pub fn resolve_in<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        context: Option<Reference<'_>>,
    ) -> Option<Path> {
        let reference = reference.into();
        let resolved = self.resolver.borrow().resolve(reference, context);
        if resolved.is_none() {
            trace!(?reference, "unresolvable reference");
        }
        resolved
    }

    pub fn default_context(&self) -> Path {
        self.resolver.borrow().default_context().clone()
    }

    /// Replace the context relative references resolve against.
    pub fn set_default_context<'r>(&self, context: impl Into<Reference<'r>>) -> Option<Path> {
        let context = context.into();
        let resolved = self.resolver.borrow_mut().set_default_context(context);
        if let Some(path) = &resolved {
            debug!(context = %path, "default context changed");
        }
        resolved
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get<'r>(&self, reference: impl Into<Reference<'r>>) -> Option<Value> {
        self.get_in(reference, None)
    }

    pub fn get_in<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        context: Option<Reference<'_>>,
    ) -> Option<Value> {
        let path = self.resolve_in(reference, context)?;
        self.store.borrow().get(&path).cloned()
    }

    /// Borrow the value at `reference` without cloning it.
    ///
    /// The model must not be mutated from inside `f`.
    pub fn with_value<'r, T>(
        &self,
        reference: impl Into<Reference<'r>>,
        f: impl FnOnce(Option<&Value>) -> T,
    ) -> T {
        let path = self.resolve(reference);
        let store = self.store.borrow();
        f(path.as_ref().and_then(|path| store.get(path)))
    }

    /// A copy of the whole tree.
    pub fn snapshot(&self) -> Value {
        self.store.borrow().root().clone()
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Write `value`, materializing missing containers, and notify
    /// observers if the stored value changed. Returns the value written.
    pub fn set<'r>(&self, reference: impl Into<Reference<'r>>, value: Value) -> Option<Value> {
        self.set_from(reference, value, None)
    }

    pub fn set_in<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        context: Option<Reference<'_>>,
        value: Value,
    ) -> Option<Value> {
        let path = self.resolve_in(reference, context)?;
        self.write(&path, value, None)
    }

    /// [`set`](Self::set) attributed to an external target: observers whose
    /// handle is `source` are not notified of this write.
    pub fn set_from<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        value: Value,
        source: Option<&Rc<dyn ExternalTarget>>,
    ) -> Option<Value> {
        let path = self.resolve(reference)?;
        self.write(&path, value, source)
    }

    fn write(
        &self,
        path: &Path,
        value: Value,
        source: Option<&Rc<dyn ExternalTarget>>,
    ) -> Option<Value> {
        let assigned = value.clone();
        let outcome = self.store.borrow_mut().set(path, value);
        match outcome {
            SetOutcome::Changed => {
                debug!(path = %path, "value set");
                self.dispatch(path, ChangeKind::Set, source);
            }
            SetOutcome::Unchanged => trace!(path = %path, "value unchanged"),
        }
        Some(assigned)
    }

    /// Remove the value at `reference`.
    ///
    /// Never creates containers. When an intermediate container is missing
    /// nothing happens and [`DeleteOutcome::Absent`] is returned; otherwise
    /// observers are notified even if the terminal key was already gone.
    pub fn delete<'r>(&self, reference: impl Into<Reference<'r>>) -> DeleteOutcome {
        let Some(path) = self.resolve(reference) else {
            return DeleteOutcome::Absent;
        };
        let outcome = self.store.borrow_mut().delete(&path);
        match &outcome {
            DeleteOutcome::Deleted(previous) => {
                debug!(path = %path, existed = previous.is_some(), "value deleted");
                self.dispatch(&path, ChangeKind::Delete, None);
            }
            DeleteOutcome::Absent => trace!(path = %path, "delete on missing path"),
        }
        outcome
    }

    /// Fill missing keys at `reference` from `defaults`, keeping existing
    /// values. Applying the same defaults again changes nothing.
    pub fn defaults<'r>(&self, reference: impl Into<Reference<'r>>, defaults: Value) -> Option<Value> {
        let path = self.resolve(reference)?;
        let merged = merge_defaults(self.store.borrow().get(&path), &defaults);
        self.write(&path, merged, None)
    }

    // ── Bindings ────────────────────────────────────────────────────────

    /// Register `observer` at `reference`. Returns the bound path.
    pub fn bind<'r>(&self, reference: impl Into<Reference<'r>>, observer: Observer) -> Option<Path> {
        let path = self.resolve(reference)?;
        debug!(path = %path, ?observer, "bind");
        self.registry.borrow_mut().bind(&path, observer);
        Some(path)
    }

    pub fn bind_fn<'r, F>(&self, reference: impl Into<Reference<'r>>, callback: F) -> Option<Path>
    where
        F: Fn(&Model, &ChangeRecord) + 'static,
    {
        self.bind(reference, Observer::callback(callback))
    }

    /// Bind a path without an observer of its own. The returned target
    /// records deliveries for polling.
    pub fn bind_path<'r>(&self, reference: impl Into<Reference<'r>>) -> Option<Rc<PathTarget>> {
        let path = self.resolve(reference)?;
        let target = Rc::new(PathTarget::new(path.clone()));
        let handle: Rc<dyn ExternalTarget> = target.clone();
        self.bind(&path, Observer::external(handle))?;
        Some(target)
    }

    /// Bind a host control in both directions. See [`ControlBinding`].
    pub fn bind_control<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        control: Rc<dyn Control>,
    ) -> Option<ControlBinding> {
        let path = self.resolve(reference)?;
        Some(ControlBinding::attach(self, path, control))
    }

    /// Drop all observers bound at exactly `reference`. Returns how many
    /// were removed.
    pub fn unbind<'r>(&self, reference: impl Into<Reference<'r>>) -> usize {
        let Some(path) = self.resolve(reference) else {
            return 0;
        };
        let removed = self
            .registry
            .borrow_mut()
            .unbind(&path)
            .map_or(0, |observers| observers.len());
        debug!(path = %path, removed, "unbind");
        removed
    }

    /// Observers bound at exactly `reference`, in registration order.
    pub fn observers<'r>(&self, reference: impl Into<Reference<'r>>) -> Vec<Observer> {
        let Some(path) = self.resolve(reference) else {
            return Vec::new();
        };
        self.registry
            .borrow()
            .lookup(&path)
            .map(<[Observer]>::to_vec)
            .unwrap_or_default()
    }

    /// Canonical strings of every bound path.
    pub fn bound_paths(&self) -> Vec<String> {
        self.registry.borrow().keys().map(str::to_string).collect()
    }

    // ── Notification ────────────────────────────────────────────────────

    /// Notify observers at every prefix of `reference` as if it had
    /// changed. Returns the notified path.
    pub fn trigger<'r>(
        &self,
        reference: impl Into<Reference<'r>>,
        kind: ChangeKind,
        source: Option<&Rc<dyn ExternalTarget>>,
    ) -> Option<Path> {
        let path = self.resolve(reference)?;
        self.dispatch(&path, kind, source);
        Some(path)
    }

    /// Walk the prefixes of `path` root to leaf and notify their observers
    /// in registration order.
    ///
    /// Observer lists are snapshotted per prefix and no borrow is held while
    /// an observer runs. A panicking observer aborts the rest of the walk.
    fn dispatch(&self, path: &Path, kind: ChangeKind, source: Option<&Rc<dyn ExternalTarget>>) {
        for index in 0..=path.len() {
            let prefix = path.prefix(index);
            let observers = match self.registry.borrow().lookup(&prefix) {
                Some(observers) => observers.to_vec(),
                None => continue,
            };
            for observer in &observers {
                if observer.is_source(source) {
                    trace!(prefix = %prefix, "skipping change source");
                    continue;
                }
                let record = self.change_record(path, index, kind);
                trace!(prefix = %prefix, ?observer, "notify");
                match observer {
                    Observer::Callback(callback) => callback(self, &record),
                    Observer::External { handle, notify } => {
                        notify.as_ref().unwrap_or(handle).update(self, &record)
                    }
                }
            }
        }
    }

    fn change_record(&self, path: &Path, index: usize, kind: ChangeKind) -> ChangeRecord {
        let store = self.store.borrow();
        let prefix = path.prefix(index);
        let value = store.get(&prefix).cloned();
        let parent = prefix
            .parent()
            .and_then(|parent| store.get(&parent).cloned());
        ChangeRecord {
            kind,
            value,
            path: path.clone(),
            index,
            parent,
        }
    }

    // ── Templates ───────────────────────────────────────────────────────

    /// See [`template::substitute`].
    pub fn substitute(
        &self,
        template: &str,
        transform: Option<Transform<'_>>,
        context: Option<Reference<'_>>,
    ) -> String {
        template::substitute(self, template, transform, context)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("config", &self.config)
            .field("default_context", &self.default_context())
            .field("bound_paths", &self.bound_paths())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn counter(model: &Model, path: &str) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        model.bind_fn(path, move |_, _| seen.set(seen.get() + 1));
        count
    }

    #[test]
    fn test_set_returns_assigned_value() {
        let model = Model::new();
        assert_eq!(model.set("/a", json!(1)), Some(json!(1)));
        assert_eq!(model.set("/a", json!(1)), Some(json!(1)));
    }

    #[test]
    fn test_relative_reference_uses_default_context() {
        let model = Model::new();
        model.set_default_context("/form");
        model.set("name", json!("x"));
        assert_eq!(model.snapshot(), json!({"form": {"name": "x"}}));
        assert_eq!(model.get("name"), Some(json!("x")));
        assert_eq!(model.get_in("name", Some("/other".into())), None);
    }

    #[test]
    fn test_set_in_context() {
        let model = Model::new();
        model.set_in("b", Some("/a".into()), json!(true));
        assert_eq!(model.get("/a/b"), Some(json!(true)));
    }

    #[test]
    fn test_with_value_borrows() {
        let model = Model::new();
        model.set("/s", json!("abc"));
        let len = model.with_value("/s", |v| v.and_then(Value::as_str).map(str::len));
        assert_eq!(len, Some(3));
        assert!(model.with_value("/missing", |v| v.is_none()));
    }

    #[test]
    fn test_idempotent_set_notifies_once() {
        let model = Model::new();
        let count = counter(&model, "/p");
        model.set("/p", json!(5));
        model.set("/p", json!(5));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_delete_absent_does_not_notify() {
        let model = Model::new();
        let count = counter(&model, "/");
        assert_eq!(model.delete("/x/y"), DeleteOutcome::Absent);
        assert_eq!(count.get(), 0);
        assert_eq!(model.snapshot(), json!({}));
    }

    #[test]
    fn test_delete_missing_terminal_still_notifies() {
        let model = Model::new();
        model.set("/x/a", json!(1));
        let count = counter(&model, "/x/b");
        assert_eq!(model.delete("/x/b"), DeleteOutcome::Deleted(None));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_defaults_idempotent() {
        let model = Model::new();
        let count = counter(&model, "/x");
        model.defaults("/x", json!({"k": 1}));
        model.defaults("/x", json!({"k": 2}));
        assert_eq!(model.get("/x/k"), Some(json!(1)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unresolvable_reference_is_noop() {
        let model = Model::new();
        let orphan = json_bind_path::ScopeElement::root();
        let scope = Reference::Scope(&*orphan);
        assert_eq!(model.set(scope, json!(1)), None);
        assert_eq!(model.get(scope), None);
        assert_eq!(model.delete(scope), DeleteOutcome::Absent);
        assert_eq!(model.bind_fn(scope, |_, _| {}), None);
        assert_eq!(model.unbind(scope), 0);
        assert!(model.bound_paths().is_empty());
    }

    #[test]
    fn test_bind_path_polling() {
        let model = Model::new();
        let target = model.bind_path("/poll").unwrap();
        model.set("/poll/inner", json!(1));
        assert!(target.take_pending());
        assert!(!target.take_pending());
        assert_eq!(target.deliveries(), 1);
    }

    #[test]
    fn test_observers_lookup() {
        let model = Model::new();
        model.bind_fn("/a", |_, _| {});
        model.bind_fn("/a", |_, _| {});
        assert_eq!(model.observers("/a").len(), 2);
        assert!(model.observers("/a/b").is_empty());
        assert_eq!(model.bound_paths(), vec!["/a".to_string()]);
    }

    #[test]
    fn test_debug_lists_bound_paths() {
        let model = Model::new();
        model.bind_fn("/a", |_, _| {});
        let debug = format!("{model:?}");
        assert!(debug.contains("/a"));
    }
}
