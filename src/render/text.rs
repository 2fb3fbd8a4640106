//! Plain-text and subject derivation.
//!
//! Both derive from the final structure, never from the compiled HTML, so
//! they stay correct even when the markup skeleton changes.

use serde_json::Value;

/// Subject precedence: `title.text`, then the `email_title` alias, then a
/// literal `{{title}}` sentinel. The sentinel surfaces a template
/// authoring defect instead of silently sending without a subject.
pub fn derive_subject(tree: &Value) -> String {
    tree.get("title")
        .and_then(|title| title.get("text"))
        .and_then(Value::as_str)
        .or_else(|| tree.get("email_title").and_then(Value::as_str))
        .unwrap_or("{{title}}")
        .to_string()
}

/// Concatenate, in document order: title text, body paragraphs, action
/// label+URL lines, footer tagline and copyright. Blocks are separated by
/// blank lines; absent sections contribute nothing.
pub fn derive_text(tree: &Value) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(text) = tree
        .get("title")
        .and_then(|title| title.get("text"))
        .and_then(Value::as_str)
    {
        blocks.push(text.to_string());
    }

    if let Some(paragraphs) = tree
        .get("body")
        .and_then(|body| body.get("paragraphs"))
        .and_then(Value::as_array)
    {
        let lines: Vec<&str> = paragraphs.iter().filter_map(Value::as_str).collect();
        if !lines.is_empty() {
            blocks.push(lines.join("\n\n"));
        }
    }

    if let Some(actions) = tree.get("actions") {
        for slot in ["primary", "secondary"] {
            if let Some(line) = actions.get(slot).and_then(action_line) {
                blocks.push(line);
            }
        }
    }

    if let Some(footer) = tree.get("footer") {
        if let Some(tagline) = footer.get("tagline").and_then(Value::as_str) {
            blocks.push(tagline.to_string());
        }
        if let Some(copyright) = footer.get("copyright").and_then(Value::as_str) {
            blocks.push(copyright.to_string());
        }
    }

    blocks.join("\n\n")
}

fn action_line(action: &Value) -> Option<String> {
    if action.get("show").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let label = action.get("label").and_then(Value::as_str)?;
    match action.get("url").and_then(Value::as_str) {
        Some(url) => Some(format!("{label}: {url}")),
        None => Some(label.to_string()),
    }
}
