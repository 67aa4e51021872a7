use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::axum_http::error_responses::ErrorResponse;

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn not_found() -> impl IntoResponse {
    ErrorResponse::into_response_with(StatusCode::NOT_FOUND, "route not found")
}
