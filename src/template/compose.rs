//! Three-layer template composition.
//!
//! The final structure handed to the render pipeline is built from the
//! stored base tree, the stored locale override and the caller's variable
//! bag, in that precedence order. One recursive [`deep_merge`] drives both
//! the base⊕locale merge and the variable-override merge so the two can
//! never diverge. Composition is a pure function of its inputs; loading
//! the stored trees is the store's job.

use serde_json::{json, Map, Value};

use super::normalize::{convert_legacy_actions, normalize};
use super::variables::resolve_tree;

/// Recursively merge `overlay` into `base`. Object fields recurse; arrays
/// and scalar values replace wholesale, never concatenate.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_val @ Value::Object(_)) if overlay_val.is_object() => {
                        deep_merge(base_val, overlay_val);
                    }
                    _ => {
                        base_map.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Merge base structure, locale override and caller variables into the
/// final structure.
///
/// Callers pass the already-resolved locale tree; `None` means render the
/// base verbatim (either the `__base__` sentinel or a locale with no
/// stored override).
pub fn compose(
    base: &Value,
    locale_override: Option<&Value>,
    variables: &Map<String, Value>,
) -> Value {
    let mut merged = base.clone();
    if let Some(overlay) = locale_override {
        deep_merge(&mut merged, overlay);
    }

    let merged = normalize(&merged);

    let mut final_tree = resolve_tree(&merged, variables);

    apply_variable_overrides(&mut final_tree, variables);

    // Caller variables may have reintroduced the legacy button shape
    if let Some(Value::Object(actions)) = final_tree.get_mut("actions") {
        convert_legacy_actions(actions);
    }

    derive_aliases(&mut final_tree);

    final_tree
}

/// Fold the variable bag into the tree: object values deep-merge into the
/// matching section, the `title` string shorthand lands in `title.text`,
/// everything else overwrites the top-level field.
fn apply_variable_overrides(tree: &mut Value, variables: &Map<String, Value>) {
    let Value::Object(root) = tree else { return };

    for (key, value) in variables {
        match value {
            Value::Object(_) => {
                let slot = root.entry(key.clone()).or_insert_with(|| json!({}));
                deep_merge(slot, value);
            }
            Value::String(text) if key == "title" => {
                let title = root.entry("title".to_string()).or_insert_with(default_title);
                if !title.is_object() {
                    *title = default_title();
                }
                if let Value::Object(title) = title {
                    title.insert("text".to_string(), json!(text));
                }
            }
            other => {
                root.insert(key.clone(), other.clone());
            }
        }
    }
}

fn default_title() -> Value {
    json!({
        "size": "28px",
        "weight": "700",
        "color": "#1f2937",
        "align": "center"
    })
}

/// Aliases the markup skeleton expects. Additive only: a value already set
/// by the structure or the caller is never overwritten.
fn derive_aliases(tree: &mut Value) {
    let Value::Object(root) = tree else { return };

    if !root.contains_key("email_title") {
        if let Some(text) = root
            .get("title")
            .and_then(|title| title.get("text"))
            .cloned()
        {
            root.insert("email_title".to_string(), text);
        }
    }

    if !root.contains_key("workspace_name") {
        if let Some(tagline) = root
            .get("header")
            .and_then(|header| header.get("tagline"))
            .cloned()
        {
            root.insert("workspace_name".to_string(), tagline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test variables must be an object"),
        }
    }

    #[test]
    fn test_deep_merge_objects_recurse() {
        let mut base = json!({"title": {"text": "Hi", "color": "#111111"}});
        deep_merge(&mut base, &json!({"title": {"text": "Hola"}}));
        assert_eq!(base["title"]["text"], "Hola");
        assert_eq!(base["title"]["color"], "#111111");
    }

    #[test]
    fn test_deep_merge_arrays_replace_wholesale() {
        let mut base = json!({"body": {"paragraphs": ["a", "b", "c"]}});
        deep_merge(&mut base, &json!({"body": {"paragraphs": ["x"]}}));
        assert_eq!(base["body"]["paragraphs"], json!(["x"]));
    }

    #[test]
    fn test_deep_merge_scalar_replaces_object() {
        let mut base = json!({"support": {"email": "help@acme.io"}});
        deep_merge(&mut base, &json!({"support": "disabled"}));
        assert_eq!(base["support"], "disabled");
    }

    #[test]
    fn test_locale_override_precedence() {
        let base = json!({"title": {"text": "Hi"}});
        let es = json!({"title": {"text": "Hola"}});

        let with_locale = compose(&base, Some(&es), &Map::new());
        assert_eq!(with_locale["title"]["text"], "Hola");

        let base_only = compose(&base, None, &Map::new());
        assert_eq!(base_only["title"]["text"], "Hi");
    }

    #[test]
    fn test_title_shorthand_creates_default_title() {
        let base = json!({"body": {"paragraphs": ["Hi"]}});
        let variables = vars(json!({"title": "Hello"}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["title"]["text"], "Hello");
        assert_eq!(out["title"]["size"], "28px");
        assert_eq!(out["title"]["weight"], "700");
        assert_eq!(out["title"]["color"], "#1f2937");
        assert_eq!(out["title"]["align"], "center");
    }

    #[test]
    fn test_title_shorthand_preserves_existing_fields() {
        let base = json!({"title": {"text": "Old", "size": "32px", "color": "#000000"}});
        let variables = vars(json!({"title": "New"}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["title"]["text"], "New");
        assert_eq!(out["title"]["size"], "32px");
        assert_eq!(out["title"]["color"], "#000000");
    }

    #[test]
    fn test_object_variable_deep_merges_into_section() {
        let base = json!({"footer": {"tagline": "Acme", "copyright": "© Acme"}});
        let variables = vars(json!({"footer": {"tagline": "Acme Inc."}}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["footer"]["tagline"], "Acme Inc.");
        assert_eq!(out["footer"]["copyright"], "© Acme");
    }

    #[test]
    fn test_scalar_variable_overwrites_top_level_field() {
        let base = json!({"preheader": "old"});
        let variables = vars(json!({"preheader": "new", "priority": 2}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["preheader"], "new");
        assert_eq!(out["priority"], 2);
    }

    #[test]
    fn test_legacy_actions_from_base_converted() {
        let base = json!({"actions": {"primaryButton": {"label": "Go", "url": "https://x"}}});

        let out = compose(&base, None, &Map::new());
        assert_eq!(
            out["actions"]["primary"],
            json!({
                "show": true,
                "label": "Go",
                "url": "https://x",
                "style": "button",
                "color": "#3b82f6",
                "text_color": "#ffffff"
            })
        );
        assert!(out["actions"].get("primaryButton").is_none());
    }

    #[test]
    fn test_legacy_actions_from_variables_converted() {
        let base = json!({"title": {"text": "Hi"}});
        let variables = vars(json!({
            "actions": {"primaryButton": {"label": "Buy", "url": "https://x/buy"}}
        }));

        let out = compose(&base, None, &variables);
        assert_eq!(out["actions"]["primary"]["label"], "Buy");
        assert_eq!(out["actions"]["primary"]["color"], "#3b82f6");
        assert!(out["actions"].get("primaryButton").is_none());
    }

    #[test]
    fn test_aliases_derived() {
        let base = json!({
            "header": {"tagline": "Acme"},
            "title": {"text": "Welcome"}
        });

        let out = compose(&base, None, &Map::new());
        assert_eq!(out["email_title"], "Welcome");
        assert_eq!(out["workspace_name"], "Acme");
    }

    #[test]
    fn test_aliases_never_overwrite_caller_values() {
        let base = json!({
            "header": {"tagline": "Acme"},
            "title": {"text": "Welcome"}
        });
        let variables = vars(json!({"workspace_name": "Custom", "email_title": "Subject"}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["workspace_name"], "Custom");
        assert_eq!(out["email_title"], "Subject");
    }

    #[test]
    fn test_placeholders_resolved_before_overrides() {
        let base = json!({
            "title": {"text": "Welcome {{user|friend}}"},
            "body": {"paragraphs": ["Hi {{user|friend}}!"]}
        });
        let variables = vars(json!({"user": "Sam"}));

        let out = compose(&base, None, &variables);
        assert_eq!(out["title"]["text"], "Welcome Sam");
        assert_eq!(out["body"]["paragraphs"][0], "Hi Sam!");
    }
}
