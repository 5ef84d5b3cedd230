//! Scope chains.
//!
//! A host UI tree can declare, per node, zero or one path piece under a
//! reserved attribute (`data-model` by default). The resolver walks the
//! chain from a starting node outward, prepending each declaration, and
//! stops at the first absolute one.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A node in an external scope tree.
///
/// Implementations are read-only from the resolver's point of view.
pub trait ScopeNode {
    /// The path piece this node declares under `attribute`, if any.
    fn declared_segment(&self, attribute: &str) -> Option<String>;

    /// The enclosing scope.
    fn parent_scope(&self) -> Option<&dyn ScopeNode>;
}

/// A minimal parent-linked scope tree node.
///
/// Useful for hosts without their own tree type:
///
/// ```
/// use json_bind_path::{PathResolver, Reference, ScopeElement};
///
/// let form = ScopeElement::root();
/// form.set_attribute("data-model", "/user");
/// let input = ScopeElement::child_of(&form);
/// input.set_attribute("data-model", "name");
///
/// let path = PathResolver::new().resolve(Reference::Scope(&*input), None).unwrap();
/// assert_eq!(path.to_string(), "/user/name");
/// ```
#[derive(Debug, Default)]
pub struct ScopeElement {
    parent: Option<Rc<ScopeElement>>,
    attributes: RefCell<BTreeMap<String, String>>,
}

impl ScopeElement {
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn child_of(parent: &Rc<ScopeElement>) -> Rc<Self> {
        Rc::new(Self {
            parent: Some(Rc::clone(parent)),
            attributes: RefCell::new(BTreeMap::new()),
        })
    }

    pub fn parent(&self) -> Option<&Rc<ScopeElement>> {
        self.parent.as_ref()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow_mut().remove(name)
    }
}

impl ScopeNode for ScopeElement {
    fn declared_segment(&self, attribute: &str) -> Option<String> {
        self.attribute(attribute).filter(|value| !value.is_empty())
    }

    fn parent_scope(&self) -> Option<&dyn ScopeNode> {
        self.parent.as_deref().map(|parent| parent as &dyn ScopeNode)
    }
}
