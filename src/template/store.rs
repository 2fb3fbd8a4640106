//! Template and locale storage with CRUD operations.
//!
//! Every write runs the fallback-syntax check first, so a structure with a
//! nested-placeholder fallback never reaches the render path.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;

use super::types::{
    Template, TemplateError, TemplateLocale, TemplateResult, UpdateTemplateRequest, BASE_LOCALE,
};
use super::validate::validate_fallback_syntax;

/// In-memory template and locale-override storage
pub struct TemplateStore {
    templates: DashMap<String, Template>,
    locales: DashMap<(String, String), TemplateLocale>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    /// Create a new template store
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
            locales: DashMap::new(),
        }
    }

    /// Create a new template
    pub fn create(&self, template: Template) -> TemplateResult<Template> {
        template.validate()?;
        check_fallbacks(&template.json_structure)?;

        if self.templates.contains_key(&template.key) {
            return Err(TemplateError::AlreadyExists(template.key));
        }

        let key = template.key.clone();
        self.templates.insert(key.clone(), template);

        Ok(self.templates.get(&key).unwrap().clone())
    }

    /// Get a template by key
    pub fn get(&self, key: &str) -> TemplateResult<Template> {
        self.templates
            .get(key)
            .map(|t| t.clone())
            .ok_or_else(|| TemplateError::NotFound(key.to_string()))
    }

    /// List all templates
    pub fn list(&self) -> Vec<Template> {
        self.templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Update an existing template
    pub fn update(&self, key: &str, updates: UpdateTemplateRequest) -> TemplateResult<Template> {
        let mut template = self.get(key)?;

        if let Some(name) = updates.name {
            template.name = name;
        }

        if let Some(description) = updates.description {
            template.description = description;
        }

        if let Some(category) = updates.category {
            template.category = category;
        }

        if let Some(variable_schema) = updates.variable_schema {
            template.variable_schema = variable_schema;
        }

        if let Some(json_structure) = updates.json_structure {
            check_fallbacks(&json_structure)?;
            template.json_structure = json_structure;
        }

        if let Some(active) = updates.active {
            template.active = active;
        }

        template.updated_at = Utc::now();
        template.validate()?;

        self.templates.insert(key.to_string(), template.clone());

        Ok(template)
    }

    /// Delete a template and all of its locale overrides
    pub fn delete(&self, key: &str) -> TemplateResult<()> {
        self.templates
            .remove(key)
            .ok_or_else(|| TemplateError::NotFound(key.to_string()))?;

        self.locales
            .retain(|(template_key, _), _| template_key != key);

        Ok(())
    }

    /// Check if a template exists
    pub fn exists(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Get the number of stored locale overrides
    pub fn locale_count(&self) -> usize {
        self.locales.len()
    }

    /// Create or replace the override for `(template, locale)`
    pub fn upsert_locale(
        &self,
        key: &str,
        locale: &str,
        json_structure: Value,
    ) -> TemplateResult<TemplateLocale> {
        if !self.templates.contains_key(key) {
            return Err(TemplateError::NotFound(key.to_string()));
        }
        check_fallbacks(&json_structure)?;

        let now = Utc::now();
        let created_at = self
            .locales
            .get(&(key.to_string(), locale.to_string()))
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let entry = TemplateLocale {
            template_key: key.to_string(),
            locale: locale.to_string(),
            json_structure,
            created_at,
            updated_at: now,
        };
        entry.validate()?;

        self.locales
            .insert((key.to_string(), locale.to_string()), entry.clone());

        Ok(entry)
    }

    /// Get one locale override
    pub fn get_locale(&self, key: &str, locale: &str) -> TemplateResult<TemplateLocale> {
        self.locales
            .get(&(key.to_string(), locale.to_string()))
            .map(|entry| entry.clone())
            .ok_or_else(|| TemplateError::LocaleNotFound(format!("{key}/{locale}")))
    }

    /// List all locale overrides for a template
    pub fn list_locales(&self, key: &str) -> TemplateResult<Vec<TemplateLocale>> {
        if !self.templates.contains_key(key) {
            return Err(TemplateError::NotFound(key.to_string()));
        }

        Ok(self
            .locales
            .iter()
            .filter(|entry| entry.key().0 == key)
            .map(|entry| entry.value().clone())
            .collect())
    }

    /// Delete one locale override
    pub fn delete_locale(&self, key: &str, locale: &str) -> TemplateResult<()> {
        self.locales
            .remove(&(key.to_string(), locale.to_string()))
            .map(|_| ())
            .ok_or_else(|| TemplateError::LocaleNotFound(format!("{key}/{locale}")))
    }

    /// Fetch a template together with the overlay the requested locale
    /// resolves to.
    ///
    /// Resolution order: the requested locale's stored override, else the
    /// stored `en` override, else no overlay (raw base). The `__base__`
    /// sentinel always skips overlays, even when overrides exist.
    pub fn resolve(&self, key: &str, locale: &str) -> TemplateResult<(Template, Option<Value>)> {
        let template = self.get(key)?;

        if locale == BASE_LOCALE {
            return Ok((template, None));
        }

        let overlay = self
            .locales
            .get(&(key.to_string(), locale.to_string()))
            .or_else(|| self.locales.get(&(key.to_string(), "en".to_string())))
            .map(|entry| entry.json_structure.clone());

        Ok((template, overlay))
    }
}

fn check_fallbacks(structure: &Value) -> TemplateResult<()> {
    let check = validate_fallback_syntax(structure);
    if check.valid {
        Ok(())
    } else {
        let context = check
            .details
            .first()
            .map(|d| d.context.clone())
            .unwrap_or_default();
        Err(TemplateError::InvalidFallbackSyntax(context))
    }
}

/// Create an Arc-wrapped template store
pub fn create_template_store() -> Arc<TemplateStore> {
    Arc::new(TemplateStore::new())
}
