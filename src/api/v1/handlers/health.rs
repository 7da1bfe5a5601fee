/*
 * Responsibility
 * - GET /health (疎通用)
 * - auth gate の外側に置く (token 不要)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
