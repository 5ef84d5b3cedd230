//! json-bind — a path-addressable JSON model with bindings.
//!
//! A [`Model`] holds one `serde_json::Value` tree. Locations are addressed
//! by [`Path`]s, written as strings (`/pager/page`), segment sequences, or
//! scope chains. Observers bound to a path are notified whenever that path
//! or anything below it changes, root to leaf, synchronously.
//!
//! # Example
//!
//! ```
//! use json_bind::Model;
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let model = Model::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&seen);
//! model.bind_fn("/pager", move |_, record| {
//!     log.borrow_mut().push(record.value.clone());
//! });
//!
//! model.set("/pager/page", json!(2));
//! model.set("/pager/pages", json!(10));
//!
//! assert_eq!(seen.borrow().len(), 2);
//! assert_eq!(seen.borrow()[1], Some(json!({"page": 2, "pages": 10})));
//! assert_eq!(
//!     model.substitute("Page {/pager/page} of {/pager/pages}", None, None),
//!     "Page 2 of 10"
//! );
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod model;
pub mod observer;
pub mod registry;
pub mod store;
pub mod template;

pub use config::BindConfig;
pub use control::{
    read_displayed, write_displayed, Control, ControlBinding, ControlKind, CustomValueAccessor,
};
pub use error::{ConfigError, PathError};
pub use model::Model;
pub use observer::{Callback, ChangeKind, ChangeRecord, ExternalTarget, Observer, PathTarget};
pub use registry::BindingRegistry;
pub use store::{
    decide_kind, merge_defaults, ContainerKind, DeleteOutcome, ModelStore, SetOutcome,
    MAX_LIST_PADDING,
};
pub use template::{display_text, substitute, Transform, MAX_EXPANSIONS};

pub use json_bind_path::{Path, PathResolver, Reference, ScopeElement, ScopeNode};
