use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// The liveness probe payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Reports service liveness. Public: no token required.
#[axum::debug_handler]
pub async fn health() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "UP" })).into_response()
}
