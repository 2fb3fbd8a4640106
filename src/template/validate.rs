//! Write-time fallback-syntax validation, variable-usage reporting and the
//! render-input validation report.
//!
//! Validation never fails fast: every finding is collected in one pass so
//! a template author sees all problems at once. Warnings are advisory and
//! never block rendering or sending.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::normalize::normalize;
use super::variables::{detect, unique_names, DetectedVariable};

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap();
}

/// Outcome of the write-time fallback-syntax check.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FallbackViolation>,
}

/// One offending expression, located by tree path.
#[derive(Debug, Clone, Serialize)]
pub struct FallbackViolation {
    pub context: String,
    pub expression: String,
}

/// Reject fallback literals that themselves contain placeholder braces.
/// The resolver's single-pass grammar cannot disambiguate nesting, so
/// these are refused before the structure is ever persisted.
pub fn validate_fallback_syntax(tree: &Value) -> FallbackCheck {
    let mut details = Vec::new();

    for var in detect(tree) {
        if let Some(fallback) = &var.fallback {
            if fallback.contains("{{") || fallback.contains("}}") {
                details.push(FallbackViolation {
                    context: var.context.clone(),
                    expression: format!("{{{{{}|{}}}}}", var.name, fallback),
                });
            }
        }
    }

    if details.is_empty() {
        FallbackCheck {
            valid: true,
            message: None,
            details,
        }
    } else {
        FallbackCheck {
            valid: false,
            message: Some("fallback values must not contain nested placeholders".to_string()),
            details,
        }
    }
}

/// Variable-usage report consumed by the docs and validation endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableReport {
    pub detected_variables: Vec<String>,
    pub variable_details: Vec<DetectedVariable>,
}

pub fn variable_report(tree: &Value) -> VariableReport {
    let details = detect(tree);
    VariableReport {
        detected_variables: unique_names(&details),
        variable_details: details,
    }
}

/// Typed, blocking findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingRequiredVariable,
    InvalidUrl,
    InvalidColor,
    InvalidDate,
    ExceedsLimit,
    InvalidProgressBar,
    InvalidCta,
    InvalidSocialLink,
    InvalidFooterLink,
    InvalidCountdown,
    InvalidTheme,
    MissingObjectStructure,
}

/// Advisory findings; these never block rendering or sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingOptionalVariable,
    BestPracticeViolation,
    AccessibilityConcern,
    PerformanceConcern,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationFinding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub field: String,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub field: String,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationFinding>,
    pub warnings: Vec<ValidationWarning>,
}

/// Validate render inputs against the template's variable schema and the
/// normalized structure. All findings are returned in one pass.
pub fn validate_render_inputs(
    structure: &Value,
    schema: &Value,
    variables: &Map<String, Value>,
) -> ValidationReport {
    let mut report = Reporter::default();
    let tree = normalize(structure);

    check_schema_variables(schema, variables, &mut report);
    check_sections_are_objects(&tree, &mut report);
    check_header(&tree, &mut report);
    check_hero(&tree, &mut report);
    check_title(&tree, &mut report);
    check_body(&tree, &mut report);
    check_visual(&tree, &mut report);
    check_actions(&tree, &mut report);
    check_footer(&tree, &mut report);
    check_theme(&tree, &mut report);

    ValidationReport {
        valid: report.errors.is_empty(),
        errors: report.errors,
        warnings: report.warnings,
    }
}

#[derive(Default)]
struct Reporter {
    errors: Vec<ValidationFinding>,
    warnings: Vec<ValidationWarning>,
}

impl Reporter {
    fn error(&mut self, kind: FindingKind, field: &str, message: String, suggestion: &str) {
        self.errors.push(ValidationFinding {
            kind,
            field: field.to_string(),
            message,
            suggestion: suggestion.to_string(),
        });
    }

    fn warn(&mut self, kind: WarningKind, field: &str, message: String, suggestion: &str) {
        self.warnings.push(ValidationWarning {
            kind,
            field: field.to_string(),
            message,
            suggestion: suggestion.to_string(),
        });
    }
}

fn check_schema_variables(schema: &Value, variables: &Map<String, Value>, report: &mut Reporter) {
    let Value::Object(entries) = schema else { return };

    for (name, spec) in entries {
        let supplied = variables.get(name).map(|v| !v.is_null()).unwrap_or(false);
        if supplied {
            continue;
        }

        let required = spec
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let has_default = spec.get("default").map(|d| !d.is_null()).unwrap_or(false);

        if required && !has_default {
            report.error(
                FindingKind::MissingRequiredVariable,
                name,
                format!("required variable '{name}' was not supplied"),
                "pass a value for this variable or declare a default in the schema",
            );
        } else if !required {
            report.warn(
                WarningKind::MissingOptionalVariable,
                name,
                format!("optional variable '{name}' was not supplied"),
                "the placeholder fallback (or empty string) will be used",
            );
        }
    }
}

const SECTIONS: &[&str] = &[
    "header", "hero", "title", "body", "snapshot", "visual", "actions", "support", "footer",
    "theme",
];

fn check_sections_are_objects(tree: &Value, report: &mut Reporter) {
    for section in SECTIONS {
        if let Some(value) = tree.get(section) {
            if !value.is_object() {
                report.error(
                    FindingKind::MissingObjectStructure,
                    section,
                    format!("section '{section}' must be a JSON object"),
                    "wrap the section contents in an object",
                );
            }
        }
    }
}

fn check_url(value: Option<&Value>, field: &str, report: &mut Reporter) {
    if let Some(url) = value.and_then(Value::as_str) {
        if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with("mailto:"))
        {
            report.error(
                FindingKind::InvalidUrl,
                field,
                format!("'{url}' is not an absolute http(s) URL"),
                "use a full https:// URL; email clients do not resolve relative paths",
            );
        }
    }
}

fn check_color(value: Option<&Value>, field: &str, kind: FindingKind, report: &mut Reporter) {
    if let Some(color) = value.and_then(Value::as_str) {
        if !HEX_COLOR.is_match(color) {
            report.error(
                kind,
                field,
                format!("'{color}' is not a hex color"),
                "use a #rgb, #rrggbb or #rrggbbaa value",
            );
        }
    }
}

fn check_header(tree: &Value, report: &mut Reporter) {
    let Some(header) = tree.get("header").filter(|h| h.is_object()) else {
        return;
    };

    check_url(header.get("logo_url"), "header.logo_url", report);

    if header.get("logo_url").is_some() && header.get("logo_alt").is_none() {
        report.warn(
            WarningKind::AccessibilityConcern,
            "header.logo_alt",
            "logo image has no alt text".to_string(),
            "add logo_alt so screen readers can describe the logo",
        );
    }
}

fn check_hero(tree: &Value, report: &mut Reporter) {
    let Some(hero) = tree.get("hero").filter(|h| h.is_object()) else {
        return;
    };

    check_url(hero.get("image_url"), "hero.image_url", report);

    if hero.get("image_url").is_some() && hero.get("image_alt").is_none() {
        report.warn(
            WarningKind::AccessibilityConcern,
            "hero.image_alt",
            "hero image has no alt text".to_string(),
            "add image_alt so screen readers can describe the image",
        );
    }
}

fn check_title(tree: &Value, report: &mut Reporter) {
    let Some(title) = tree.get("title").filter(|t| t.is_object()) else {
        return;
    };

    if let Some(text) = title.get("text").and_then(Value::as_str) {
        if text.chars().count() > 150 {
            report.error(
                FindingKind::ExceedsLimit,
                "title.text",
                format!("title is {} characters, limit is 150", text.chars().count()),
                "shorten the title; it doubles as the subject line",
            );
        } else if text.chars().count() > 60 {
            report.warn(
                WarningKind::BestPracticeViolation,
                "title.text",
                "title longer than 60 characters will be truncated by most inboxes".to_string(),
                "keep subjects under 60 characters",
            );
        }
    }

    check_color(title.get("color"), "title.color", FindingKind::InvalidColor, report);
}

fn check_body(tree: &Value, report: &mut Reporter) {
    let Some(body) = tree.get("body").filter(|b| b.is_object()) else {
        return;
    };

    if let Some(paragraphs) = body.get("paragraphs").and_then(Value::as_array) {
        if paragraphs.len() > 20 {
            report.error(
                FindingKind::ExceedsLimit,
                "body.paragraphs",
                format!("{} paragraphs, limit is 20", paragraphs.len()),
                "split very long messages into multiple emails",
            );
        } else if paragraphs.len() > 10 {
            report.warn(
                WarningKind::PerformanceConcern,
                "body.paragraphs",
                format!("{} paragraphs produce a heavy document", paragraphs.len()),
                "long emails are clipped by some clients; aim for 10 or fewer",
            );
        }
    }
}

fn check_visual(tree: &Value, report: &mut Reporter) {
    let Some(visual) = tree.get("visual").filter(|v| v.is_object()) else {
        return;
    };

    if let Some(bars) = visual.get("progress_bars").and_then(Value::as_array) {
        for (idx, bar) in bars.iter().enumerate() {
            let field = format!("visual.progress_bars[{idx}]");
            let Value::Object(bar) = bar else {
                report.error(
                    FindingKind::InvalidProgressBar,
                    &field,
                    "progress bar entry must be an object".to_string(),
                    "use {label, current, max} entries",
                );
                continue;
            };

            let current = bar.get("current").and_then(Value::as_f64);
            let max = bar.get("max").and_then(Value::as_f64);
            match (current, max) {
                (Some(_), Some(max)) if max > 0.0 => {}
                _ => report.error(
                    FindingKind::InvalidProgressBar,
                    &field,
                    "progress bar needs numeric 'current' and positive 'max'".to_string(),
                    "supply numeric current/max values with max > 0",
                ),
            }

            if let Some(pct) = bar.get("percentage").and_then(Value::as_f64) {
                if !(0.0..=100.0).contains(&pct) {
                    report.error(
                        FindingKind::InvalidProgressBar,
                        &field,
                        format!("percentage {pct} is outside 0-100"),
                        "omit percentage and let it be derived from current/max",
                    );
                }
            }
        }
    }

    if let Some(countdown) = visual.get("countdown").filter(|c| c.is_object()) {
        match countdown.get("target_date").and_then(Value::as_str) {
            None => report.error(
                FindingKind::InvalidCountdown,
                "visual.countdown.target_date",
                "countdown has no target_date".to_string(),
                "supply an RFC 3339 instant or YYYY-MM-DD date",
            ),
            Some(raw) => {
                let parses = chrono::DateTime::parse_from_rfc3339(raw).is_ok()
                    || chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok();
                if !parses {
                    report.error(
                        FindingKind::InvalidDate,
                        "visual.countdown.target_date",
                        format!("'{raw}' is not an RFC 3339 instant or YYYY-MM-DD date"),
                        "use e.g. 2026-12-31 or 2026-12-31T12:00:00Z",
                    );
                }
            }
        }
    }
}

fn check_actions(tree: &Value, report: &mut Reporter) {
    let Some(actions) = tree.get("actions").filter(|a| a.is_object()) else {
        return;
    };

    for slot in ["primary", "secondary"] {
        let Some(action) = actions.get(slot) else {
            continue;
        };
        let field = format!("actions.{slot}");

        let Value::Object(action) = action else {
            report.error(
                FindingKind::InvalidCta,
                &field,
                "action must be an object".to_string(),
                "use {show, label, url, style, color, text_color}",
            );
            continue;
        };

        if action.get("show").and_then(Value::as_bool) == Some(false) {
            continue;
        }

        let label_ok = action
            .get("label")
            .and_then(Value::as_str)
            .map(|l| !l.is_empty())
            .unwrap_or(false);
        if !label_ok {
            report.error(
                FindingKind::InvalidCta,
                &field,
                "action has no label".to_string(),
                "set a short, imperative label",
            );
        }

        match action.get("url") {
            None => report.error(
                FindingKind::InvalidCta,
                &field,
                "action has no url".to_string(),
                "set the destination URL",
            ),
            some => check_url(some, &format!("{field}.url"), report),
        }

        check_color(
            action.get("color"),
            &format!("{field}.color"),
            FindingKind::InvalidColor,
            report,
        );
        check_color(
            action.get("text_color"),
            &format!("{field}.text_color"),
            FindingKind::InvalidColor,
            report,
        );
    }
}

fn check_footer(tree: &Value, report: &mut Reporter) {
    let Some(footer) = tree.get("footer").filter(|f| f.is_object()) else {
        return;
    };

    if let Some(links) = footer.get("social_links").and_then(Value::as_array) {
        for (idx, link) in links.iter().enumerate() {
            let field = format!("footer.social_links[{idx}]");
            let has_name = link.get("name").and_then(Value::as_str).is_some();
            let has_url = link.get("url").and_then(Value::as_str).is_some();
            if !has_name || !has_url {
                report.error(
                    FindingKind::InvalidSocialLink,
                    &field,
                    "social link needs 'name' and 'url'".to_string(),
                    "use {name, url} entries",
                );
            }
            check_url(link.get("url"), &format!("{field}.url"), report);
        }
    }

    if let Some(links) = footer.get("legal_links").and_then(Value::as_array) {
        for (idx, link) in links.iter().enumerate() {
            let field = format!("footer.legal_links[{idx}]");
            let has_label = link.get("label").and_then(Value::as_str).is_some();
            let has_url = link.get("url").and_then(Value::as_str).is_some();
            if !has_label || !has_url {
                report.error(
                    FindingKind::InvalidFooterLink,
                    &field,
                    "footer link needs 'label' and 'url'".to_string(),
                    "use {label, url} entries",
                );
            }
            check_url(link.get("url"), &format!("{field}.url"), report);
        }
    }
}

fn check_theme(tree: &Value, report: &mut Reporter) {
    let Some(Value::Object(theme)) = tree.get("theme") else {
        return;
    };

    const COLOR_FIELDS: &[&str] = &[
        "text_color",
        "heading_color",
        "background_color",
        "body_background",
        "muted_text_color",
        "primary_button_color",
        "primary_button_text_color",
    ];

    for field in COLOR_FIELDS {
        check_color(
            theme.get(*field),
            &format!("theme.{field}"),
            FindingKind::InvalidTheme,
            report,
        );
    }

    for (key, value) in theme {
        if !value.is_string() {
            report.error(
                FindingKind::InvalidTheme,
                &format!("theme.{key}"),
                "theme values must be strings".to_string(),
                "quote sizes and colors, e.g. \"16px\" or \"#1f2937\"",
            );
        }
    }
}
