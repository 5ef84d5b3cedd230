//! `{path}` placeholder substitution.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::Model;
use json_bind_path::Reference;

/// Optional value transform applied before rendering.
pub type Transform<'t> = &'t dyn Fn(&Value) -> Value;

/// Most distinct placeholders one [`substitute`] call expands.
pub const MAX_EXPANSIONS: usize = 256;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"))
}

/// Replace `{reference}` placeholders in `template` with the model values
/// they name, until none is left.
///
/// The leftmost placeholder is expanded first and every occurrence of that
/// exact token is replaced at once; then the text is scanned again from
/// the start, so placeholders produced by a substitution are expanded too.
/// References are resolved against `context` (the model's default context
/// when `None`).
///
/// A token is expanded at most once per call. If it shows up again it is
/// part of a cycle and stays in the output verbatim. At most
/// [`MAX_EXPANSIONS`] tokens are expanded.
pub fn substitute(
    model: &Model,
    template: &str,
    transform: Option<Transform<'_>>,
    context: Option<Reference<'_>>,
) -> String {
    let mut text = template.to_string();
    let mut expanded: HashSet<String> = HashSet::new();
    while let Some(token) = next_placeholder(&text, &expanded) {
        if expanded.len() == MAX_EXPANSIONS {
            trace!(%token, "placeholder expansion limit reached");
            break;
        }
        let reference = &token[1..token.len() - 1];
        let value = model
            .get_in(Reference::Pointer(reference), context)
            .unwrap_or(Value::Null);
        let value = match transform {
            Some(transform) => transform(&value),
            None => value,
        };
        text = text.replace(&token, &display_text(&value));
        expanded.insert(token);
    }
    text
}

/// Leftmost placeholder token not expanded yet.
fn next_placeholder(text: &str, expanded: &HashSet<String>) -> Option<String> {
    placeholder_regex()
        .find_iter(text)
        .map(|found| found.as_str())
        .find(|token| !expanded.contains(*token))
        .map(str::to_string)
}

/// Text shown for a value: strings verbatim, `null` as nothing, anything
/// else as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
