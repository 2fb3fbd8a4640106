//! Template composition and rendering core.
//!
//! This module provides:
//! - Template and per-locale override definitions with {{variable}} /
//!   {{variable|fallback}} placeholders
//! - In-memory template and locale storage with CRUD operations
//! - Placeholder detection, resolution and fallback semantics
//! - Canonical-shape normalization of historically inconsistent fields
//! - Three-layer composition (base, locale override, caller variables)
//! - Write-time fallback-syntax validation and render-input reports
//!
//! # Example
//!
//! ```ignore
//! let store = TemplateStore::new();
//!
//! store.create(Template {
//!     key: "welcome".to_string(),
//!     name: "Welcome".to_string(),
//!     json_structure: json!({
//!         "header": {"tagline": "Acme"},
//!         "title": {"text": "Welcome {{user|friend}}"}
//!     }),
//!     ..
//! })?;
//! store.upsert_locale("welcome", "es", json!({"title": {"text": "Bienvenido {{user|amigo}}"}}))?;
//!
//! let (template, overlay) = store.resolve("welcome", "es")?;
//! let final_tree = compose(&template.json_structure, overlay.as_ref(), &variables);
//! ```

mod compose;
mod normalize;
mod store;
mod types;
mod validate;
mod variables;

pub use compose::{compose, deep_merge};
pub use normalize::normalize;
pub use store::{create_template_store, TemplateStore};
pub use types::{
    is_supported_locale, CreateTemplateRequest, LocaleListResponse, PreviewRequest, RenderRequest,
    Template, TemplateError, TemplateListResponse, TemplateLocale, TemplateResult,
    UpdateTemplateRequest, UpsertLocaleRequest, BASE_LOCALE, SUPPORTED_LOCALES,
};
pub use validate::{
    validate_fallback_syntax, validate_render_inputs, variable_report, FallbackCheck,
    FallbackViolation, FindingKind, ValidationFinding, ValidationReport, ValidationWarning,
    VariableReport, WarningKind,
};
pub use variables::{
    detect, resolve, resolve_tree, split_expression, unique_names, DetectedVariable, PLACEHOLDER,
};
