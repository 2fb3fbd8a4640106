mod settings;

pub use settings::{RenderConfig, ServerConfig, Settings};
