pub mod auth; // X-Admin-Secret guard
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod photo; // Resize, naming, storage cleanup
pub mod routes;

// Re-export for main backend
pub use auth::ADMIN_SECRET_HEADER;
pub use handlers::AdminState;
pub use photo::PhotoError;
pub use routes::routes;
