// Domain modules
pub mod delivery;
pub mod render;
pub mod template;

// Application modules
pub mod api;
pub mod server;

// Supporting modules
pub mod config;
pub mod error;
