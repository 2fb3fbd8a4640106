//! Template and locale types, request shapes and error definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Locale sentinel meaning "use the base structure verbatim, no overlay".
pub const BASE_LOCALE: &str = "__base__";

/// ISO 639-1 codes the gateway accepts for locale overrides.
pub const SUPPORTED_LOCALES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "nl", "pl", "ja", "ko", "zh",
];

/// True for the base sentinel or any code in the supported set.
pub fn is_supported_locale(locale: &str) -> bool {
    locale == BASE_LOCALE || SUPPORTED_LOCALES.contains(&locale)
}

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template already exists: {0}")]
    AlreadyExists(String),

    #[error("Locale override not found: {0}")]
    LocaleNotFound(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("Invalid template key: {0}")]
    InvalidKey(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid fallback syntax: {0}")]
    InvalidFallbackSyntax(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Canonical, locale-independent template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique, immutable identifier (alphanumeric, dash, underscore)
    pub key: String,

    /// Human-readable template name
    pub name: String,

    /// Template description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Grouping category, e.g. "billing" or "onboarding" (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Declares required/optional variables with types, examples and
    /// defaults. Documentation and placeholder generation only; the render
    /// path never consults it.
    #[serde(default)]
    pub variable_schema: Value,

    /// Base section tree with {{variable}} placeholders
    pub json_structure: Value,

    /// Inactive templates are kept but refuse render requests
    #[serde(default = "default_active")]
    pub active: bool,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Template {
    /// Validate key, name and structure shape.
    pub fn validate(&self) -> TemplateResult<()> {
        if self.key.is_empty() || self.key.len() > 64 {
            return Err(TemplateError::InvalidKey(
                "Key must be 1-64 characters".to_string(),
            ));
        }

        if !self
            .key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TemplateError::InvalidKey(
                "Key must contain only alphanumeric, dash, or underscore".to_string(),
            ));
        }

        if self.name.is_empty() || self.name.len() > 256 {
            return Err(TemplateError::InvalidTemplate(
                "Name must be 1-256 characters".to_string(),
            ));
        }

        if !self.json_structure.is_object() {
            return Err(TemplateError::InvalidTemplate(
                "Structure must be a JSON object".to_string(),
            ));
        }

        Ok(())
    }
}

/// A sparse override of a template's structure scoped to one locale code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLocale {
    /// Owning template key
    pub template_key: String,

    /// ISO 639-1 two-letter code
    pub locale: String,

    /// Override fragment merged over the base structure
    pub json_structure: Value,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl TemplateLocale {
    pub fn validate(&self) -> TemplateResult<()> {
        // The sentinel is a selector, not a storable override
        if self.locale == BASE_LOCALE || !is_supported_locale(&self.locale) {
            return Err(TemplateError::UnsupportedLocale(self.locale.clone()));
        }

        if !self.json_structure.is_object() {
            return Err(TemplateError::InvalidTemplate(
                "Locale structure must be a JSON object".to_string(),
            ));
        }

        Ok(())
    }
}

/// Request to create a new template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// Unique template key
    pub key: String,

    /// Human-readable template name
    pub name: String,

    /// Template description (optional)
    pub description: Option<String>,

    /// Grouping category (optional)
    pub category: Option<String>,

    /// Variable schema for documentation (optional)
    #[serde(default)]
    pub variable_schema: Value,

    /// Base section tree
    pub json_structure: Value,

    /// Active flag (optional, defaults to true)
    #[serde(default = "default_active")]
    pub active: bool,
}

impl From<CreateTemplateRequest> for Template {
    fn from(req: CreateTemplateRequest) -> Self {
        let now = Utc::now();
        Template {
            key: req.key,
            name: req.name,
            description: req.description,
            category: req.category,
            variable_schema: req.variable_schema,
            json_structure: req.json_structure,
            active: req.active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing template
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    /// Human-readable template name (optional)
    pub name: Option<String>,

    /// Template description (optional, use null to clear)
    pub description: Option<Option<String>>,

    /// Grouping category (optional, use null to clear)
    pub category: Option<Option<String>>,

    /// Variable schema (optional)
    pub variable_schema: Option<Value>,

    /// Base section tree (optional)
    pub json_structure: Option<Value>,

    /// Active flag (optional)
    pub active: Option<bool>,
}

/// Request to create or replace a locale override
#[derive(Debug, Deserialize)]
pub struct UpsertLocaleRequest {
    /// ISO 639-1 two-letter code
    pub locale: String,

    /// Override fragment
    pub json_structure: Value,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}

/// Response for listing a template's locale overrides
#[derive(Debug, Serialize)]
pub struct LocaleListResponse {
    pub locales: Vec<TemplateLocale>,
    pub total: usize,
}

/// A render/send request referencing a stored template.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Template key
    pub key: String,

    /// Locale selector; `__base__` skips the overlay entirely. The
    /// configured default locale applies when absent.
    pub locale: Option<String>,

    /// Caller variable bag
    #[serde(default)]
    pub variables: Map<String, Value>,
}

/// Preview request; an inline structure previews unsaved edits without
/// persisting them. The override is scoped to this request only.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    /// Unsaved structure to preview in place of the stored base (optional)
    pub json_structure: Option<Value>,

    /// Locale selector; the configured default locale applies when absent
    pub locale: Option<String>,

    /// Caller variable bag
    #[serde(default)]
    pub variables: Map<String, Value>,
}
