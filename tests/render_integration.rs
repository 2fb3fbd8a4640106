//! End-to-end tests covering store resolution, composition and rendering
//! working together the way the HTTP handlers drive them.

use chrono::Utc;
use serde_json::{json, Map, Value};

use lumen_email_gateway::render::Renderer;
use lumen_email_gateway::template::{Template, TemplateError, TemplateStore, BASE_LOCALE};

fn template(key: &str, structure: Value) -> Template {
    Template {
        key: key.to_string(),
        name: "Integration".to_string(),
        description: None,
        category: None,
        variable_schema: Value::Null,
        json_structure: structure,
        active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn vars(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("test variables must be an object"),
    }
}

#[test]
fn renders_stored_template_end_to_end() {
    let store = TemplateStore::new();
    let renderer = Renderer::new().unwrap();

    store
        .create(template(
            "welcome",
            json!({
                "header": {"tagline": "Acme"},
                "title": {"text": "Welcome {{user|friend}}"},
                "body": {"paragraphs": ["Hi {{user|friend}}!"]},
                "actions": {
                    "primaryButton": {"label": "Open app", "url": "https://acme.io/app"}
                },
                "footer": {"tagline": "Acme", "copyright": "© 2026 Acme"}
            }),
        ))
        .unwrap();

    let (template, overlay) = store.resolve("welcome", "en").unwrap();
    let output = renderer
        .compose_and_render(
            &template.json_structure,
            overlay.as_ref(),
            &vars(json!({"user": "Sam"})),
        )
        .unwrap();

    // variables substituted, legacy button converted
    assert_eq!(output.subject, "Welcome Sam");
    assert!(output.html.contains("Welcome Sam"));
    assert!(output.html.contains("Hi Sam!"));
    assert!(output.html.contains("https://acme.io/app"));
    assert!(output.html.contains("Acme"));

    assert_eq!(
        output.text,
        "Welcome Sam\n\nHi Sam!\n\nOpen app: https://acme.io/app\n\nAcme\n\n© 2026 Acme"
    );
}

#[test]
fn fallback_applies_only_when_variable_undefined() {
    let store = TemplateStore::new();
    let renderer = Renderer::new().unwrap();

    store
        .create(template(
            "fallbacks",
            json!({"title": {"text": "Hello {{user|friend}}"}}),
        ))
        .unwrap();

    let (template, _) = store.resolve("fallbacks", "en").unwrap();

    let output = renderer
        .compose_and_render(&template.json_structure, None, &vars(json!({})))
        .unwrap();
    assert_eq!(output.subject, "Hello friend");

    // empty string is a defined value and suppresses the fallback
    let output = renderer
        .compose_and_render(&template.json_structure, None, &vars(json!({"user": ""})))
        .unwrap();
    assert_eq!(output.subject, "Hello ");
}

#[test]
fn locale_override_takes_precedence_over_base() {
    let store = TemplateStore::new();
    let renderer = Renderer::new().unwrap();

    store
        .create(template(
            "localized",
            json!({
                "title": {"text": "Welcome {{user|friend}}"},
                "body": {"paragraphs": ["Base paragraph"]}
            }),
        ))
        .unwrap();
    store
        .upsert_locale(
            "localized",
            "es",
            json!({"title": {"text": "Bienvenido {{user|amigo}}"}}),
        )
        .unwrap();

    let variables = vars(json!({}));

    let (template, overlay) = store.resolve("localized", "es").unwrap();
    let output = renderer
        .compose_and_render(&template.json_structure, overlay.as_ref(), &variables)
        .unwrap();
    // overridden title, untouched base body
    assert_eq!(output.subject, "Bienvenido amigo");
    assert!(output.html.contains("Base paragraph"));

    // an unstored locale falls back to the en override when one exists
    store
        .upsert_locale("localized", "en", json!({"title": {"text": "Hi there"}}))
        .unwrap();
    let (template, overlay) = store.resolve("localized", "fr").unwrap();
    let output = renderer
        .compose_and_render(&template.json_structure, overlay.as_ref(), &variables)
        .unwrap();
    assert_eq!(output.subject, "Hi there");

    // the sentinel ignores every override
    let (template, overlay) = store.resolve("localized", BASE_LOCALE).unwrap();
    assert!(overlay.is_none());
    let output = renderer
        .compose_and_render(&template.json_structure, None, &variables)
        .unwrap();
    assert_eq!(output.subject, "Welcome friend");
}

#[test]
fn nested_fallback_never_reaches_the_renderer() {
    let store = TemplateStore::new();

    let result = store.create(template(
        "bad",
        json!({"title": {"text": "{{name|{{other}}}}"}}),
    ));
    assert!(matches!(
        result,
        Err(TemplateError::InvalidFallbackSyntax(_))
    ));

    store
        .create(template("good", json!({"title": {"text": "ok"}})))
        .unwrap();
    let result = store.upsert_locale("good", "es", json!({"title": {"text": "{{a|{{b}}}}"}}));
    assert!(matches!(
        result,
        Err(TemplateError::InvalidFallbackSyntax(_))
    ));
}

#[test]
fn legacy_shapes_render_like_canonical_ones() {
    let renderer = Renderer::new().unwrap();
    let variables = vars(json!({}));

    let legacy = json!({
        "title": {"text": "T"},
        "visual": {"progressBars": [{"label": "Storage", "currentValue": 3, "maxValue": 4}]}
    });
    let canonical = json!({
        "title": {"text": "T"},
        "visual": {"progress_bars": [{"label": "Storage", "current": 3, "max": 4}]}
    });

    let a = renderer
        .compose_and_render(&legacy, None, &variables)
        .unwrap();
    let b = renderer
        .compose_and_render(&canonical, None, &variables)
        .unwrap();

    assert_eq!(a.html, b.html);
    assert!(a.html.contains("75%"));
}

#[test]
fn derived_aliases_are_available_to_the_skeleton() {
    let renderer = Renderer::new().unwrap();

    let output = renderer
        .compose_and_render(
            &json!({
                "header": {"tagline": "Acme Workspace"},
                "title": {"text": "Quota warning"}
            }),
            None,
            &vars(json!({})),
        )
        .unwrap();

    // email_title lands in the document head via the mj-title slot
    assert!(output.html.contains("Quota warning"));
    assert!(output.html.contains("Acme Workspace"));
    assert_eq!(output.subject, "Quota warning");
}
