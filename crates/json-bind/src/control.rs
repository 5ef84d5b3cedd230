//! Contract with UI-control adapters and two-way control bindings.
//!
//! The host toolkit implements [`Control`] for its widgets. The model never
//! looks inside a control; it only reads and writes the displayed value
//! through [`read_displayed`] and [`write_displayed`], which a control can
//! take over entirely by exposing a [`CustomValueAccessor`].
//!
//! Event transport stays with the host: it calls
//! [`ControlBinding::user_changed`] when the user edits the control, and the
//! model pushes refreshes to the control through an [`ExternalTarget`].

use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

use crate::observer::{ChangeRecord, ExternalTarget, Observer};
use crate::template::display_text;
use crate::Model;
use json_bind_path::Path;

/// Control categories with distinct default value handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Checkbox-like; the value is a boolean.
    Toggle,
    /// Select-like; a string, or a list of strings when `multiple`.
    Selection { multiple: bool },
    /// Anything showing free text.
    Text,
    /// Buttons and other controls without a value.
    Trigger,
}

/// Capability for controls that read and write their value themselves.
pub trait CustomValueAccessor {
    fn read(&self) -> Value;
    fn write(&self, value: &Value);
}

/// A host UI control.
///
/// Only the state accessors matching [`kind`](Control::kind) need real
/// implementations. Controls are shared handles, so mutation goes through
/// `&self`.
pub trait Control {
    fn kind(&self) -> ControlKind;

    fn checked(&self) -> bool {
        false
    }

    fn set_checked(&self, _checked: bool) {}

    fn selected(&self) -> Vec<String> {
        Vec::new()
    }

    fn set_selected(&self, _values: &[String]) {}

    fn text(&self) -> String {
        String::new()
    }

    fn set_text(&self, _text: &str) {}

    fn accessor(&self) -> Option<&dyn CustomValueAccessor> {
        None
    }
}

/// The value a control currently shows.
pub fn read_displayed(control: &dyn Control) -> Value {
    if let Some(accessor) = control.accessor() {
        return accessor.read();
    }
    match control.kind() {
        ControlKind::Toggle => Value::Bool(control.checked()),
        ControlKind::Selection { multiple: true } => {
            Value::Array(control.selected().into_iter().map(Value::String).collect())
        }
        ControlKind::Selection { multiple: false } => control
            .selected()
            .into_iter()
            .next()
            .map_or(Value::Null, Value::String),
        ControlKind::Text => Value::String(control.text()),
        ControlKind::Trigger => Value::Null,
    }
}

/// Make a control show `value`.
pub fn write_displayed(control: &dyn Control, value: &Value) {
    if let Some(accessor) = control.accessor() {
        accessor.write(value);
        return;
    }
    match control.kind() {
        ControlKind::Toggle => control.set_checked(is_truthy(value)),
        ControlKind::Selection { .. } => control.set_selected(&selection_of(value)),
        ControlKind::Text => control.set_text(&display_text(value)),
        ControlKind::Trigger => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn selection_of(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(display_text).collect(),
        other => vec![display_text(other)],
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Refreshes a control from change records at its bound path.
struct ControlTarget {
    control: Rc<dyn Control>,
}

impl ExternalTarget for ControlTarget {
    fn update(&self, _model: &Model, record: &ChangeRecord) {
        trace!(path = %record.prefix(), "refreshing control");
        write_displayed(&*self.control, record.value.as_ref().unwrap_or(&Value::Null));
    }
}

/// A control bound to a model path in both directions.
pub struct ControlBinding {
    path: Path,
    control: Rc<dyn Control>,
    target: Rc<dyn ExternalTarget>,
}

impl ControlBinding {
    /// Register `control` at `path` and sync it once.
    ///
    /// A value already in the model is shown by the control; otherwise a
    /// non-blank value shown by the control seeds the model.
    pub(crate) fn attach(model: &Model, path: Path, control: Rc<dyn Control>) -> Self {
        let target: Rc<dyn ExternalTarget> = Rc::new(ControlTarget {
            control: Rc::clone(&control),
        });
        model.bind(&path, Observer::external(Rc::clone(&target)));
        let binding = Self {
            path,
            control,
            target,
        };
        match model.get(&binding.path) {
            Some(value) => write_displayed(&*binding.control, &value),
            None => {
                let shown = read_displayed(&*binding.control);
                if !is_blank(&shown) {
                    model.set_from(&binding.path, shown, Some(&binding.target));
                }
            }
        }
        binding
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn control(&self) -> &Rc<dyn Control> {
        &self.control
    }

    /// The identity this binding writes under; deliveries to it are
    /// suppressed for its own writes.
    pub fn handle(&self) -> &Rc<dyn ExternalTarget> {
        &self.target
    }

    /// Push the control's displayed value into the model.
    ///
    /// Call from the host's "value changed by user" event. Other observers
    /// are notified; this control is not.
    pub fn user_changed(&self, model: &Model) -> Option<Value> {
        if self.control.kind() == ControlKind::Trigger && self.control.accessor().is_none() {
            return None;
        }
        let value = read_displayed(&*self.control);
        model.set_from(&self.path, value, Some(&self.target))
    }

    /// Re-show the model value, e.g. after the host rebuilt the control.
    pub fn refresh(&self, model: &Model) {
        let value = model.get(&self.path).unwrap_or(Value::Null);
        write_displayed(&*self.control, &value);
    }

    /// Remove every observer at this binding's path.
    pub fn unbind(self, model: &Model) -> usize {
        model.unbind(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeControl {
        kind: Option<ControlKind>,
        checked: RefCell<bool>,
        selected: RefCell<Vec<String>>,
        text: RefCell<String>,
    }

    impl FakeControl {
        fn of(kind: ControlKind) -> Self {
            Self {
                kind: Some(kind),
                ..Self::default()
            }
        }
    }

    impl Control for FakeControl {
        fn kind(&self) -> ControlKind {
            self.kind.unwrap_or(ControlKind::Text)
        }
        fn checked(&self) -> bool {
            *self.checked.borrow()
        }
        fn set_checked(&self, checked: bool) {
            *self.checked.borrow_mut() = checked;
        }
        fn selected(&self) -> Vec<String> {
            self.selected.borrow().clone()
        }
        fn set_selected(&self, values: &[String]) {
            *self.selected.borrow_mut() = values.to_vec();
        }
        fn text(&self) -> String {
            self.text.borrow().clone()
        }
        fn set_text(&self, text: &str) {
            *self.text.borrow_mut() = text.to_string();
        }
    }

    struct Upper(RefCell<String>);

    impl CustomValueAccessor for Upper {
        fn read(&self) -> Value {
            Value::String(self.0.borrow().to_lowercase())
        }
        fn write(&self, value: &Value) {
            *self.0.borrow_mut() = display_text(value).to_uppercase();
        }
    }

    impl Control for Upper {
        fn kind(&self) -> ControlKind {
            ControlKind::Text
        }
        fn accessor(&self) -> Option<&dyn CustomValueAccessor> {
            Some(self)
        }
    }

    #[test]
    fn test_toggle() {
        let control = FakeControl::of(ControlKind::Toggle);
        write_displayed(&control, &json!(1));
        assert_eq!(read_displayed(&control), json!(true));
        write_displayed(&control, &json!(""));
        assert_eq!(read_displayed(&control), json!(false));
    }

    #[test]
    fn test_single_selection() {
        let control = FakeControl::of(ControlKind::Selection { multiple: false });
        assert_eq!(read_displayed(&control), Value::Null);
        write_displayed(&control, &json!("b"));
        assert_eq!(read_displayed(&control), json!("b"));
    }

    #[test]
    fn test_multiple_selection() {
        let control = FakeControl::of(ControlKind::Selection { multiple: true });
        write_displayed(&control, &json!(["a", 2]));
        assert_eq!(read_displayed(&control), json!(["a", "2"]));
        write_displayed(&control, &Value::Null);
        assert_eq!(read_displayed(&control), json!([]));
    }

    #[test]
    fn test_text() {
        let control = FakeControl::of(ControlKind::Text);
        write_displayed(&control, &json!(42));
        assert_eq!(read_displayed(&control), json!("42"));
    }

    #[test]
    fn test_trigger_is_noop() {
        let control = FakeControl::of(ControlKind::Trigger);
        write_displayed(&control, &json!("x"));
        assert_eq!(*control.text.borrow(), "");
        assert_eq!(read_displayed(&control), Value::Null);
    }

    #[test]
    fn test_custom_accessor_wins() {
        let control = Upper(RefCell::new(String::new()));
        write_displayed(&control, &json!("hello"));
        assert_eq!(*control.0.borrow(), "HELLO");
        assert_eq!(read_displayed(&control), json!("hello"));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!({})));
    }
}
