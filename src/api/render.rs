//! Rendering endpoints: production render, author preview and the
//! render-input validation report.
//!
//! Preview and render share one composition path, so a previewed email is
//! exactly what a recipient would receive for the same inputs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::template::{
    deep_merge, is_supported_locale, validate_fallback_syntax, validate_render_inputs,
    PreviewRequest, RenderRequest, TemplateError, ValidationReport,
};

/// A rendered email plus the inputs that produced it.
#[derive(Debug, Serialize)]
pub struct RenderedEmailResponse {
    pub key: String,
    pub locale: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// POST /api/v1/emails/render - Render a stored template to a full email
#[tracing::instrument(
    name = "http.render_email",
    skip(state, request),
    fields(template_key = %request.key, locale = ?request.locale)
)]
pub async fn render_email(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<RenderedEmailResponse>> {
    let locale = resolve_locale(&state, request.locale)?;

    let (template, overlay) = state.template_store.resolve(&request.key, &locale)?;
    if !template.active {
        return Err(AppError::Validation(format!(
            "Template is inactive: {}",
            template.key
        )));
    }

    let output = state.renderer.compose_and_render(
        &template.json_structure,
        overlay.as_ref(),
        &request.variables,
    )?;

    Ok(Json(RenderedEmailResponse {
        key: request.key,
        locale,
        subject: output.subject,
        html: output.html,
        text: output.text,
    }))
}

/// POST /api/v1/templates/{key}/preview - Render with optional unsaved edits
///
/// An inline `json_structure` replaces the stored base for this request
/// only; nothing is persisted. Locale overrides still apply on top, so an
/// author sees localized output for the draft they are editing.
#[tracing::instrument(
    name = "http.preview_template",
    skip(state, request),
    fields(locale = ?request.locale)
)]
pub async fn preview_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<RenderedEmailResponse>> {
    let locale = resolve_locale(&state, request.locale)?;

    let (template, overlay) = state.template_store.resolve(&key, &locale)?;

    let base = match &request.json_structure {
        Some(inline) => {
            if !inline.is_object() {
                return Err(TemplateError::InvalidTemplate(
                    "Structure must be a JSON object".to_string(),
                )
                .into());
            }
            // Inline drafts bypass the store's write-time guard, so the
            // same fallback check runs here.
            let check = validate_fallback_syntax(inline);
            if !check.valid {
                let context = check
                    .details
                    .first()
                    .map(|d| d.context.clone())
                    .unwrap_or_default();
                return Err(TemplateError::InvalidFallbackSyntax(context).into());
            }
            inline
        }
        None => &template.json_structure,
    };

    let output = state
        .renderer
        .compose_and_render(base, overlay.as_ref(), &request.variables)?;

    Ok(Json(RenderedEmailResponse {
        key,
        locale,
        subject: output.subject,
        html: output.html,
        text: output.text,
    }))
}

/// Request body for the validation report endpoint.
#[derive(Debug, Deserialize)]
pub struct ValidateRenderRequest {
    /// Locale selector; the configured default locale applies when absent
    pub locale: Option<String>,

    #[serde(default)]
    pub variables: Map<String, Value>,
}

/// POST /api/v1/templates/{key}/validate - Report all render-input problems
#[tracing::instrument(
    name = "http.validate_template",
    skip(state, request),
    fields(locale = ?request.locale)
)]
pub async fn validate_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<ValidateRenderRequest>,
) -> Result<Json<ValidationReport>> {
    let locale = resolve_locale(&state, request.locale)?;

    let (template, overlay) = state.template_store.resolve(&key, &locale)?;

    // Validate the structure the render would actually see
    let mut structure = template.json_structure.clone();
    if let Some(overlay) = overlay {
        deep_merge(&mut structure, &overlay);
    }

    let report = validate_render_inputs(&structure, &template.variable_schema, &request.variables);
    Ok(Json(report))
}

/// The configured default locale applies when the request names none.
fn resolve_locale(state: &AppState, requested: Option<String>) -> Result<String> {
    let locale = requested.unwrap_or_else(|| state.settings.render.default_locale.clone());
    if is_supported_locale(&locale) {
        Ok(locale)
    } else {
        Err(TemplateError::UnsupportedLocale(locale).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RenderConfig, ServerConfig, Settings};
    use serde_json::json;

    fn state_with_default_locale(locale: &str) -> AppState {
        let settings = Settings {
            server: ServerConfig::default(),
            render: RenderConfig {
                default_locale: locale.to_string(),
            },
        };
        AppState::new(settings).unwrap()
    }

    #[test]
    fn test_resolve_locale_uses_configured_default() {
        let state = state_with_default_locale("es");

        assert_eq!(resolve_locale(&state, None).unwrap(), "es");
        assert_eq!(
            resolve_locale(&state, Some("fr".to_string())).unwrap(),
            "fr"
        );
        assert!(matches!(
            resolve_locale(&state, Some("xx".to_string())),
            Err(AppError::Template(TemplateError::UnsupportedLocale(_)))
        ));
    }

    #[tokio::test]
    async fn test_render_without_locale_takes_configured_default() {
        let state = state_with_default_locale("es");
        state
            .template_store
            .create(crate::template::Template {
                key: "welcome".to_string(),
                name: "Welcome".to_string(),
                description: None,
                category: None,
                variable_schema: Value::Null,
                json_structure: json!({"title": {"text": "Hello"}}),
                active: true,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            })
            .unwrap();
        state
            .template_store
            .upsert_locale("welcome", "es", json!({"title": {"text": "Hola"}}))
            .unwrap();

        let request = RenderRequest {
            key: "welcome".to_string(),
            locale: None,
            variables: Map::new(),
        };

        let Json(response) = render_email(State(state), Json(request)).await.unwrap();
        assert_eq!(response.locale, "es");
        assert_eq!(response.subject, "Hola");
    }
}
