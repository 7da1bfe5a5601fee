/*
 * Responsibility
 * - GET /me: gate が付与した identity をそのまま返す (疎通・token 確認用)
 */
use axum::Json;

use crate::api::v1::extractors::{Identity, RequestIdentity};

pub async fn me(Identity(identity): Identity) -> Json<RequestIdentity> {
    Json(identity)
}
