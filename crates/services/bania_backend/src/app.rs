use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use bania_admin::AdminState;
use bania_common::API_PREFIX;
use bania_db::DbClient;
use chrono::Utc;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app_state::AppState;

#[axum::debug_handler]
async fn health_handler(State(db): State<Option<DbClient>>) -> impl IntoResponse {
    let (status, store) = match db {
        Some(db) => {
            if db.is_healthy().await {
                (StatusCode::OK, "postgres")
            } else {
                (StatusCode::SERVICE_UNAVAILABLE, "postgres")
            }
        }
        None => (StatusCode::OK, "memory"),
    };
    let body = json!({
        "ok": status == StatusCode::OK,
        "store": store,
        "timestamp": Utc::now().to_rfc3339(),
    });
    (status, Json(body))
}

/// All feature routers nested under `/api`, plus the Swagger UI with `openapi`.
pub fn build_router(state: &AppState) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Bania API!" }))
        .route("/health", get(health_handler))
        .with_state(state.db.clone())
        .merge(bania_calendly::routes(
            state.config.clone(),
            state.bookings.clone(),
            state.notifier.clone(),
        ))
        .merge(bania_telegram::routes(state.config.clone()))
        .merge(bania_miniapp::routes(state.events.clone(), state.cache.clone()))
        .merge(bania_admin::routes(AdminState {
            config: state.config.clone(),
            events: state.events.clone(),
            bookings: state.bookings.clone(),
            storage: state.storage.clone(),
            cache: state.cache.clone(),
            calendly: state.calendly.clone(),
        }));

    #[allow(unused_mut)] // only mutated with the openapi feature
    let mut app = Router::new().nest(API_PREFIX, api_router);

    #[cfg(feature = "openapi")]
    {
        use bania_admin::doc::AdminApiDoc;
        use bania_calendly::doc::CalendlyApiDoc;
        use bania_miniapp::doc::MiniAppApiDoc;
        use bania_telegram::doc::TelegramApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bania API",
                version = "0.1.0",
                description = "Bania booking platform: webhooks, admin and Mini App"
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(CalendlyApiDoc::openapi());
        openapi_doc.merge(TelegramApiDoc::openapi());
        openapi_doc.merge(MiniAppApiDoc::openapi());
        openapi_doc.merge(AdminApiDoc::openapi());
        info!("Adding Swagger UI at {}/docs", API_PREFIX);

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    info!("Routes mounted under {}", API_PREFIX);
    app.layer(TraceLayer::new_for_http())
}
