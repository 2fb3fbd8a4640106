//! Placeholder grammar and variable substitution.
//!
//! A placeholder is `{{name}}` or `{{name|fallback}}` embedded in a string
//! leaf of a section tree. The grammar lives here, in one regex, and both
//! the resolver and the write-time fallback validator parse expressions
//! through [`split_expression`] so the two can never drift apart.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

lazy_static! {
    /// Matches a full placeholder expression; capture group 1 is the inner
    /// `name` or `name|fallback` text. `[^}]+` keeps the scan single-pass,
    /// which is why nested placeholders are rejected at write time.
    pub static ref PLACEHOLDER: Regex = Regex::new(r"\{\{([^}]+)\}\}").unwrap();
}

/// A placeholder occurrence found in a section tree.
///
/// The same name may appear at several contexts; callers that need
/// uniqueness compute it with [`unique_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedVariable {
    pub name: String,
    /// Dotted/indexed path of the string leaf containing the placeholder,
    /// e.g. `body.paragraphs[1]`.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

/// Split a placeholder's inner expression on the first `|` into a trimmed
/// name and optional trimmed fallback literal.
pub fn split_expression(expr: &str) -> (String, Option<String>) {
    match expr.split_once('|') {
        Some((name, fallback)) => (name.trim().to_string(), Some(fallback.trim().to_string())),
        None => (expr.trim().to_string(), None),
    }
}

/// Walk strings, arrays and objects recursively and record every
/// placeholder occurrence in natural traversal order (object key insertion
/// order, then array index order).
pub fn detect(tree: &Value) -> Vec<DetectedVariable> {
    let mut found = Vec::new();
    walk(tree, "", &mut found);
    found
}

fn walk(value: &Value, path: &str, found: &mut Vec<DetectedVariable>) {
    match value {
        Value::String(text) => {
            for caps in PLACEHOLDER.captures_iter(text) {
                let (name, fallback) = split_expression(&caps[1]);
                found.push(DetectedVariable {
                    name,
                    context: path.to_string(),
                    fallback,
                });
            }
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{idx}]"), found);
            }
        }
        Value::Object(map) => {
            for (key, val) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(val, &child, found);
            }
        }
        _ => {}
    }
}

/// De-duplicate detected variables by name, preserving first-seen order.
pub fn unique_names(detected: &[DetectedVariable]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for var in detected {
        if !names.iter().any(|n| n == &var.name) {
            names.push(var.name.clone());
        }
    }
    names
}

/// Replace every placeholder occurrence in a single string.
///
/// A defined, non-null bag value always wins; `0`, `false` and `""` count
/// as defined. An undefined or null value takes the fallback literal when
/// one was written, else the empty string. No `{{...}}` survives the pass.
pub fn resolve(text: &str, variables: &Map<String, Value>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let (name, fallback) = split_expression(&caps[1]);
            match variables.get(&name) {
                Some(value) if !value.is_null() => stringify(value),
                _ => fallback.unwrap_or_default(),
            }
        })
        .into_owned()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Arrays and objects substitute as their JSON representation
        other => other.to_string(),
    }
}

/// Apply [`resolve`] to every string leaf, preserving array/object shape.
/// Non-string leaves pass through unchanged.
pub fn resolve_tree(tree: &Value, variables: &Map<String, Value>) -> Value {
    match tree {
        Value::String(text) => Value::String(resolve(text, variables)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_tree(item, variables))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, val) in map {
                out.insert(key.clone(), resolve_tree(val, variables));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}
