use bania_backend::{build_router, AppState};
use bania_common::logging;
use bania_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    // Held until exit so the file writer flushes
    let _log_guard = logging::init_with_config(&config.logging);
    info!("Starting Bania backend (run_env={})", config.run_env);

    let state = match AppState::from_config(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize the store: {}", e);
            std::process::exit(1);
        }
    };
    let app = build_router(&state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
