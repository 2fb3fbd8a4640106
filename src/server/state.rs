use std::sync::Arc;

use crate::config::Settings;
use crate::render::Renderer;
use crate::template::{create_template_store, TemplateStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub template_store: Arc<TemplateStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let renderer = Renderer::new().map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self {
            settings: Arc::new(settings),
            template_store: create_template_store(),
            renderer: Arc::new(renderer),
        })
    }
}
