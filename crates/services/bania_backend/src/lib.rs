pub mod app; // Router assembly
pub mod app_state;
pub mod service_factory;

pub use app::build_router;
pub use app_state::AppState;
