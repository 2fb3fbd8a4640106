//! Template and locale CRUD endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::server::AppState;
use crate::template::{
    variable_report, CreateTemplateRequest, LocaleListResponse, Template, TemplateListResponse,
    TemplateLocale, UpdateTemplateRequest, UpsertLocaleRequest, VariableReport,
};

/// POST /api/v1/templates - Create a new template
#[tracing::instrument(
    name = "http.create_template",
    skip(state, request),
    fields(template_key = %request.key)
)]
pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>)> {
    let template: Template = request.into();
    let created = state.template_store.create(template)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/templates - List all templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state.template_store.list();
    let total = templates.len();

    Json(TemplateListResponse { templates, total })
}

/// GET /api/v1/templates/{key} - Get a specific template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Template>> {
    Ok(Json(state.template_store.get(&key)?))
}

/// PUT /api/v1/templates/{key} - Update an existing template
#[tracing::instrument(name = "http.update_template", skip(state, request))]
pub async fn update_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>> {
    Ok(Json(state.template_store.update(&key, request)?))
}

/// DELETE /api/v1/templates/{key} - Delete a template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.template_store.delete(&key)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{key}/locales - List a template's locale overrides
#[tracing::instrument(name = "http.list_locales", skip(state))]
pub async fn list_locales(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LocaleListResponse>> {
    let locales = state.template_store.list_locales(&key)?;
    let total = locales.len();

    Ok(Json(LocaleListResponse { locales, total }))
}

/// POST /api/v1/templates/{key}/locales - Create or replace a locale override
#[tracing::instrument(
    name = "http.upsert_locale",
    skip(state, request),
    fields(locale = %request.locale)
)]
pub async fn upsert_locale(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpsertLocaleRequest>,
) -> Result<(StatusCode, Json<TemplateLocale>)> {
    let entry =
        state
            .template_store
            .upsert_locale(&key, &request.locale, request.json_structure)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/templates/{key}/locales/{locale} - Get one locale override
#[tracing::instrument(name = "http.get_locale", skip(state))]
pub async fn get_locale(
    State(state): State<AppState>,
    Path((key, locale)): Path<(String, String)>,
) -> Result<Json<TemplateLocale>> {
    Ok(Json(state.template_store.get_locale(&key, &locale)?))
}

/// DELETE /api/v1/templates/{key}/locales/{locale} - Delete a locale override
#[tracing::instrument(name = "http.delete_locale", skip(state))]
pub async fn delete_locale(
    State(state): State<AppState>,
    Path((key, locale)): Path<(String, String)>,
) -> Result<StatusCode> {
    state.template_store.delete_locale(&key, &locale)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/templates/{key}/variables - Placeholder usage report
#[tracing::instrument(name = "http.template_variables", skip(state))]
pub async fn template_variables(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<VariableReport>> {
    let template = state.template_store.get(&key)?;
    Ok(Json(variable_report(&template.json_structure)))
}
