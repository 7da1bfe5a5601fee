/*
 * Responsibility
 * - POST /admin/echo: privileged route の audit 経路確認用
 * - body をそのまま返す (audit log に request/response が 1 組出る)
 */
use axum::Json;
use serde_json::Value;

use crate::api::v1::extractors::Identity;

pub async fn echo(Identity(identity): Identity, Json(payload): Json<Value>) -> Json<Value> {
    tracing::debug!(user_id = identity.user_id, "admin echo");
    Json(payload)
}
