use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use bania_common::action_failure_body;
use bania_config::AppConfig;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Rejects admin requests whose `X-Admin-Secret` header does not match
/// `admin.api_secret`. Without a configured secret every request is refused.
pub async fn admin_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = config.admin_secret() else {
        error!("Admin API secret not configured, refusing admin request");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(action_failure_body("Admin API is not configured")),
        )
            .into_response();
    };

    let provided = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(secret) if constant_time_eq(secret.as_bytes(), expected.as_bytes()) => {
            debug!("Admin request authenticated: {} {}", req.method(), req.uri().path());
            next.run(req).await
        }
        Some(_) => {
            warn!("Admin request with invalid secret");
            (StatusCode::UNAUTHORIZED, Json(action_failure_body("Unauthorized"))).into_response()
        }
        None => {
            warn!("Admin request without {} header", ADMIN_SECRET_HEADER);
            (
                StatusCode::UNAUTHORIZED,
                Json(action_failure_body(&format!(
                    "Unauthorized: missing {} header",
                    ADMIN_SECRET_HEADER
                ))),
            )
                .into_response()
        }
    }
}
