use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::{BaniaError, HttpStatusCode};

pub mod client;

/// Prefix every feature router is nested under.
pub const API_PREFIX: &str = "/api";

fn status_of(err: &BaniaError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Errors render as `{"error": {"message", "code"}}`.
impl IntoResponse for BaniaError {
    fn into_response(self) -> Response {
        let status_code = status_of(&self);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

/// Failure of an admin action, rendered as `{"success": false, "error": "..."}`.
///
/// Admin surfaces report third-party and store failures through this shape
/// instead of the nested error body.
#[derive(Debug)]
pub struct ActionFailure(pub BaniaError);

impl From<BaniaError> for ActionFailure {
    fn from(err: BaniaError) -> Self {
        ActionFailure(err)
    }
}

impl IntoResponse for ActionFailure {
    fn into_response(self) -> Response {
        let status_code = status_of(&self.0);
        (status_code, Json(action_failure_body(&self.0.to_string()))).into_response()
    }
}

pub fn action_failure_body(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

/// Builds a successful action body, merging `extra` object fields next to `success`.
pub fn action_success(extra: Value) -> Json<Value> {
    let mut body = json!({ "success": true });
    if let (Value::Object(target), Value::Object(fields)) = (&mut body, extra) {
        target.extend(fields);
    }
    Json(body)
}

/// A plain `(status, {"error": message})` response used by webhook receivers.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Like [`json_error`] with an extra `details` field.
pub fn json_error_with_details(status: StatusCode, message: &str, details: Value) -> Response {
    (status, Json(json!({ "error": message, "details": details }))).into_response()
}
