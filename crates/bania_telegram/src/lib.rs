pub mod bot;
pub mod client;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use notify::TelegramNotifier;
pub use routes::{routes, routes_with_client};
