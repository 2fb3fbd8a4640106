//! Canonical-shape normalization for section trees.
//!
//! Stored structures accumulated several naming conventions over time:
//! camelCase fields, an older button shape under `actions`, aliased
//! progress-bar fields. [`normalize`] collapses all of them so downstream
//! code only ever reads the canonical snake_case field. The pass is pure
//! and idempotent; when both spellings exist the canonical one wins.

use serde_json::{json, Map, Value};

/// Rewrite every legacy field spelling in `tree` to its canonical form.
pub fn normalize(tree: &Value) -> Value {
    let mut out = tree.clone();
    let Value::Object(root) = &mut out else {
        return out;
    };

    if let Some(Value::Object(header)) = root.get_mut("header") {
        alias(header, "logoUrl", "logo_url");
        alias(header, "logoAlt", "logo_alt");
    }

    if let Some(Value::Object(body)) = root.get_mut("body") {
        alias(body, "fontSize", "font_size");
        alias(body, "lineHeight", "line_height");
    }

    if let Some(Value::Object(hero)) = root.get_mut("hero") {
        alias(hero, "imageUrl", "image_url");
        alias(hero, "imageAlt", "image_alt");
        alias(hero, "imageWidth", "image_width");
        alias(hero, "iconSize", "icon_size");
    }

    if let Some(Value::Object(visual)) = root.get_mut("visual") {
        normalize_visual(visual);
    }

    if let Some(Value::Object(actions)) = root.get_mut("actions") {
        convert_legacy_actions(actions);
    }

    if let Some(Value::Object(footer)) = root.get_mut("footer") {
        alias(footer, "socialLinks", "social_links");
        alias(footer, "legalLinks", "legal_links");
    }

    if let Some(Value::Object(theme)) = root.get_mut("theme") {
        normalize_theme(theme);
    }

    out
}

/// Move `legacy` to `canonical` when the canonical field is absent. When
/// both exist the canonical value is preserved and the stale legacy copy
/// dropped, so the output only ever carries the canonical spelling.
fn alias(obj: &mut Map<String, Value>, legacy: &str, canonical: &str) {
    if obj.contains_key(canonical) {
        obj.remove(legacy);
    } else if let Some(value) = obj.remove(legacy) {
        obj.insert(canonical.to_string(), value);
    }
}

fn normalize_visual(visual: &mut Map<String, Value>) {
    alias(visual, "progressBars", "progress_bars");

    if let Some(Value::Array(bars)) = visual.get_mut("progress_bars") {
        for bar in bars.iter_mut() {
            if let Value::Object(bar) = bar {
                normalize_progress_bar(bar);
            }
        }
    }

    if let Some(Value::Object(countdown)) = visual.get_mut("countdown") {
        alias(countdown, "targetDate", "target_date");
        alias(countdown, "showDays", "show_days");
        alias(countdown, "showHours", "show_hours");
        alias(countdown, "showMinutes", "show_minutes");
        alias(countdown, "showSeconds", "show_seconds");
    }
}

fn normalize_progress_bar(bar: &mut Map<String, Value>) {
    alias(bar, "currentValue", "current");
    alias(bar, "maxValue", "max");

    // An explicit percentage always wins; otherwise it is derived when
    // both bounds are numeric and the max is positive.
    if !bar.contains_key("percentage") {
        let current = bar.get("current").and_then(Value::as_f64);
        let max = bar.get("max").and_then(Value::as_f64);
        if let (Some(current), Some(max)) = (current, max) {
            if max > 0.0 {
                let percentage = (current / max * 100.0).round() as i64;
                bar.insert("percentage".to_string(), json!(percentage));
            }
        }
    }
}

/// Rewrite the legacy `primaryButton`/`secondaryButton` shape into the
/// canonical `primary`/`secondary` shape. Re-run after variable overrides,
/// since caller variables may reintroduce the legacy shape; idempotent.
pub(crate) fn convert_legacy_actions(actions: &mut Map<String, Value>) {
    convert_button(actions, "primaryButton", "primary", "#3b82f6");
    convert_button(actions, "secondaryButton", "secondary", "#6b7280");
}

fn convert_button(
    actions: &mut Map<String, Value>,
    legacy: &str,
    canonical: &str,
    default_color: &str,
) {
    if actions.contains_key(canonical) {
        actions.remove(legacy);
        return;
    }
    let old = match actions.remove(legacy) {
        Some(Value::Object(map)) => map,
        // A malformed legacy value is dropped rather than propagated
        Some(_) | None => return,
    };

    let mut button = Map::new();
    button.insert("show".to_string(), json!(true));
    if let Some(label) = old.get("label") {
        button.insert("label".to_string(), label.clone());
    }
    if let Some(url) = old.get("url") {
        button.insert("url".to_string(), url.clone());
    }
    button.insert("style".to_string(), json!("button"));
    button.insert(
        "color".to_string(),
        old.get("backgroundColor")
            .cloned()
            .unwrap_or_else(|| json!(default_color)),
    );
    button.insert(
        "text_color".to_string(),
        old.get("textColor")
            .cloned()
            .unwrap_or_else(|| json!("#ffffff")),
    );

    actions.insert(canonical.to_string(), Value::Object(button));
}

fn normalize_theme(theme: &mut Map<String, Value>) {
    const THEME_ALIASES: &[(&str, &str)] = &[
        ("fontFamily", "font_family"),
        ("fontSize", "font_size"),
        ("textColor", "text_color"),
        ("headingColor", "heading_color"),
        ("backgroundColor", "background_color"),
        ("bodyBackground", "body_background"),
        ("mutedTextColor", "muted_text_color"),
        ("primaryButtonColor", "primary_button_color"),
        ("primaryButtonTextColor", "primary_button_text_color"),
    ];

    for (legacy, canonical) in THEME_ALIASES {
        alias(theme, legacy, canonical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_is_idempotent() {
        let tree = json!({
            "header": {"logoUrl": "https://x/logo.png"},
            "hero": {"imageUrl": "https://x/h.png", "imageAlt": "h"},
            "visual": {
                "progressBars": [{"label": "Storage", "currentValue": 3, "maxValue": 4}],
                "countdown": {"targetDate": "2026-12-31", "showDays": true}
            },
            "actions": {"primaryButton": {"label": "Go", "url": "https://x"}},
            "footer": {"socialLinks": [{"name": "X", "url": "https://x"}]},
            "theme": {"fontFamily": "Inter", "bodyBackground": "#ffffff"}
        });

        let once = normalize(&tree);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_wins_over_legacy() {
        let tree = json!({
            "header": {"logoUrl": "https://old/logo.png", "logo_url": "https://new/logo.png"}
        });

        let out = normalize(&tree);
        assert_eq!(out["header"]["logo_url"], "https://new/logo.png");
        assert!(out["header"].get("logoUrl").is_none());
    }

    #[test]
    fn test_header_and_body_aliases() {
        let tree = json!({
            "header": {"logoUrl": "https://x/logo.png", "logoAlt": "Acme"},
            "body": {"fontSize": "15px", "lineHeight": "1.5"}
        });

        let out = normalize(&tree);
        assert_eq!(out["header"]["logo_url"], "https://x/logo.png");
        assert_eq!(out["header"]["logo_alt"], "Acme");
        assert_eq!(out["body"]["font_size"], "15px");
        assert_eq!(out["body"]["line_height"], "1.5");
    }

    #[test]
    fn test_progress_bar_percentage_derived() {
        let tree = json!({
            "visual": {"progressBars": [{"currentValue": 3, "maxValue": 4}]}
        });

        let out = normalize(&tree);
        let bar = &out["visual"]["progress_bars"][0];
        assert_eq!(bar["current"], 3);
        assert_eq!(bar["max"], 4);
        assert_eq!(bar["percentage"], 75);
    }

    #[test]
    fn test_progress_bar_explicit_percentage_kept() {
        let tree = json!({
            "visual": {"progress_bars": [{"current": 3, "max": 4, "percentage": 50}]}
        });

        let out = normalize(&tree);
        assert_eq!(out["visual"]["progress_bars"][0]["percentage"], 50);
    }

    #[test]
    fn test_progress_bar_zero_max_leaves_percentage_unset() {
        let tree = json!({
            "visual": {"progress_bars": [{"current": 3, "max": 0}]}
        });

        let out = normalize(&tree);
        assert!(out["visual"]["progress_bars"][0].get("percentage").is_none());
    }

    #[test]
    fn test_countdown_aliases() {
        let tree = json!({
            "visual": {"countdown": {"targetDate": "2026-12-31", "showHours": false}}
        });

        let out = normalize(&tree);
        let countdown = &out["visual"]["countdown"];
        assert_eq!(countdown["target_date"], "2026-12-31");
        assert_eq!(countdown["show_hours"], false);
        assert!(countdown.get("targetDate").is_none());
    }

    #[test]
    fn test_legacy_primary_button_converted() {
        let tree = json!({
            "actions": {"primaryButton": {"label": "Go", "url": "https://x"}}
        });

        let out = normalize(&tree);
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
    fn test_legacy_secondary_button_keeps_supplied_colors() {
        let tree = json!({
            "actions": {
                "secondaryButton": {
                    "label": "Later",
                    "url": "https://x/later",
                    "backgroundColor": "#111111",
                    "textColor": "#eeeeee"
                }
            }
        });

        let out = normalize(&tree);
        let secondary = &out["actions"]["secondary"];
        assert_eq!(secondary["color"], "#111111");
        assert_eq!(secondary["text_color"], "#eeeeee");
    }

    #[test]
    fn test_canonical_action_wins_over_legacy() {
        let tree = json!({
            "actions": {
                "primary": {"show": true, "label": "New", "url": "https://new"},
                "primaryButton": {"label": "Old", "url": "https://old"}
            }
        });

        let out = normalize(&tree);
        assert_eq!(out["actions"]["primary"]["label"], "New");
        assert!(out["actions"].get("primaryButton").is_none());
    }

    #[test]
    fn test_theme_aliases() {
        let tree = json!({
            "theme": {
                "fontFamily": "Inter",
                "textColor": "#333333",
                "primaryButtonColor": "#0000ff",
                "text_color": "#222222"
            }
        });

        let out = normalize(&tree);
        assert_eq!(out["theme"]["font_family"], "Inter");
        // canonical already present, legacy dropped
        assert_eq!(out["theme"]["text_color"], "#222222");
        assert_eq!(out["theme"]["primary_button_color"], "#0000ff");
    }

    #[test]
    fn test_sections_without_legacy_fields_untouched() {
        let tree = json!({
            "title": {"text": "Hello"},
            "footer": {"copyright": "© Acme"}
        });

        assert_eq!(normalize(&tree), tree);
    }
}
