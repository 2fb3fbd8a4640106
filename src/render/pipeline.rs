//! Markup rendering pipeline.
//!
//! The final structure is interpolated into an MJML skeleton (one named
//! slot per section) through handlebars, then compiled to email-client-safe
//! HTML by mrml. A parse failure fails the render call. Plain text and
//! subject come from the structure itself (src/render/text.rs), never from
//! the HTML.

use handlebars::Handlebars;
use mrml::prelude::render::RenderOptions;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::template::compose;

use super::helpers;
use super::text::{derive_subject, derive_text};

const SKELETON: &str = include_str!("skeleton.mjml.hbs");
const SKELETON_NAME: &str = "email_skeleton";

/// Render-path error type. Storage misses are the caller's concern; only
/// interpolation and markup compilation can fail here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unable to interpolate structure into markup skeleton: {0}")]
    Interpolation(#[from] handlebars::RenderError),

    #[error("unable to parse markup document: {0}")]
    Parsing(#[from] mrml::prelude::parser::Error),

    #[error("unable to render markup document: {0}")]
    Rendering(#[from] mrml::prelude::render::Error),
}

/// A fully rendered email.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub html: String,
    pub text: String,
    pub subject: String,
}

/// Stateless renderer; safe to share behind an `Arc` across requests.
pub struct Renderer {
    handlebars: Handlebars<'static>,
    render_options: RenderOptions,
}

impl Renderer {
    pub fn new() -> Result<Self, Box<handlebars::TemplateError>> {
        let mut handlebars = Handlebars::new();
        helpers::register(&mut handlebars);
        handlebars.register_template_string(SKELETON_NAME, SKELETON)?;

        Ok(Self {
            handlebars,
            render_options: RenderOptions::default(),
        })
    }

    /// The single compose-then-render path. Preview and production sends
    /// both go through here so that what an author previews is
    /// byte-for-byte what a recipient receives.
    pub fn compose_and_render(
        &self,
        base: &Value,
        locale_override: Option<&Value>,
        variables: &Map<String, Value>,
    ) -> Result<RenderOutput, RenderError> {
        let final_tree = compose(base, locale_override, variables);
        self.render(&final_tree)
    }

    /// Render an already-composed final structure.
    pub fn render(&self, final_tree: &Value) -> Result<RenderOutput, RenderError> {
        let markup = self.handlebars.render(SKELETON_NAME, final_tree)?;

        let document = mrml::parse(&markup)?;
        let html = document.render(&self.render_options)?;

        Ok(RenderOutput {
            html,
            text: derive_text(final_tree),
            subject: derive_subject(final_tree),
        })
    }
}
