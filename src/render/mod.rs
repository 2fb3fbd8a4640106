//! Email rendering: handlebars interpolation over an MJML skeleton,
//! compiled to HTML, with plain text and subject derived alongside.

mod helpers;
mod pipeline;
mod text;

pub use pipeline::{RenderError, RenderOutput, Renderer};
pub use text::{derive_subject, derive_text};
