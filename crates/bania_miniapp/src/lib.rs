pub mod doc;
pub mod handlers;
pub mod logic; // Labels and the Calendly embed url
pub mod render;
pub mod routes;

// Re-export for main backend
pub use handlers::MiniAppState;
pub use routes::routes;
