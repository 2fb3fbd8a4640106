mod health;
mod render;
mod routes;
mod template;

pub use routes::api_routes;
