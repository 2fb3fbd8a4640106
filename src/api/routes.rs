//! Route table.

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::{health, render, template};

/// Build the full application router.
pub fn api_routes() -> Router<AppState> {
    let templates = Router::new()
        .route(
            "/templates",
            post(template::create_template).get(template::list_templates),
        )
        .route(
            "/templates/{key}",
            get(template::get_template)
                .put(template::update_template)
                .delete(template::delete_template),
        )
        .route(
            "/templates/{key}/locales",
            post(template::upsert_locale).get(template::list_locales),
        )
        .route(
            "/templates/{key}/locales/{locale}",
            get(template::get_locale).delete(template::delete_locale),
        )
        .route(
            "/templates/{key}/variables",
            get(template::template_variables),
        )
        .route("/templates/{key}/validate", post(render::validate_template))
        .route("/templates/{key}/preview", post(render::preview_template));

    let emails = Router::new().route("/emails/render", post(render::render_email));

    Router::new()
        .route("/health", get(health::health))
        .route("/stats", get(health::stats))
        .nest("/api/v1", templates.merge(emails))
}
