use std::cell::RefCell;
use std::rc::Rc;

use json_bind::{Control, ControlKind, Model};
use serde_json::json;

#[derive(Default)]
struct TextBox {
    text: RefCell<String>,
    writes: RefCell<usize>,
}

impl Control for TextBox {
    fn kind(&self) -> ControlKind {
        ControlKind::Text
    }
    fn text(&self) -> String {
        self.text.borrow().clone()
    }
    fn set_text(&self, text: &str) {
        *self.writes.borrow_mut() += 1;
        *self.text.borrow_mut() = text.to_string();
    }
}

impl TextBox {
    fn type_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }
}

#[derive(Default)]
struct CheckBox {
    checked: RefCell<bool>,
}

impl Control for CheckBox {
    fn kind(&self) -> ControlKind {
        ControlKind::Toggle
    }
    fn checked(&self) -> bool {
        *self.checked.borrow()
    }
    fn set_checked(&self, checked: bool) {
        *self.checked.borrow_mut() = checked;
    }
}

#[test]
fn control_model_value_wins_on_attach() {
    let model = Model::new();
    model.set("/user/name", json!("Ada"));
    let input = Rc::new(TextBox::default());
    input.type_text("ignored");

    model.bind_control("/user/name", input.clone()).unwrap();
    assert_eq!(input.text(), "Ada");
    assert_eq!(model.get("/user/name"), Some(json!("Ada")));
}

#[test]
fn control_seeds_missing_model_value() {
    let model = Model::new();
    let input = Rc::new(TextBox::default());
    input.type_text("prefilled");

    model.bind_control("/user/name", input.clone()).unwrap();
    assert_eq!(model.get("/user/name"), Some(json!("prefilled")));
    assert_eq!(*input.writes.borrow(), 0);

    let blank = Rc::new(TextBox::default());
    model.bind_control("/user/other", blank).unwrap();
    assert_eq!(model.get("/user/other"), None);
}

#[test]
fn control_two_way_sync() {
    let model = Model::new();
    let first = Rc::new(TextBox::default());
    let second = Rc::new(TextBox::default());
    let a = model.bind_control("/title", first.clone()).unwrap();
    model.bind_control("/title", second.clone()).unwrap();

    model.set("/title", json!("from model"));
    assert_eq!(first.text(), "from model");
    assert_eq!(second.text(), "from model");
    let writes_before = *first.writes.borrow();

    first.type_text("from user");
    assert_eq!(a.user_changed(&model), Some(json!("from user")));
    assert_eq!(model.get("/title"), Some(json!("from user")));
    assert_eq!(second.text(), "from user");
    assert_eq!(*first.writes.borrow(), writes_before);
}

#[test]
fn control_toggle_follows_set_and_delete() {
    let model = Model::new();
    let toggle = Rc::new(CheckBox::default());
    model.bind_control("/flags/dark", toggle.clone()).unwrap();

    model.set("/flags/dark", json!(true));
    assert!(toggle.checked());

    // Writes below the bound path reach it; writes above do not.
    model.set("/flags", json!({"dark": false}));
    assert!(toggle.checked());

    model.delete("/flags/dark");
    assert!(!toggle.checked());
}

#[test]
fn control_unbind_stops_refresh() {
    let model = Model::new();
    let input = Rc::new(TextBox::default());
    let binding = model.bind_control("/x", input.clone()).unwrap();
    assert_eq!(binding.path().to_string(), "/x");

    assert_eq!(binding.unbind(&model), 1);
    model.set("/x", json!("later"));
    assert_eq!(input.text(), "");
}

#[test]
fn control_refresh_after_rebuild() {
    let model = Model::new();
    model.set("/x", json!(7));
    let input = Rc::new(TextBox::default());
    let binding = model.bind_control("/x", input.clone()).unwrap();
    input.type_text("stale");
    binding.refresh(&model);
    assert_eq!(input.text(), "7");
}
