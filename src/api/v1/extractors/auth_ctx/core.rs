use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use super::RequestIdentity;

/// Handler で、 RequestIdentity を受け取るための extractor
/// auth gate が RequestIdentity を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（bypass 配下・ミドルウェア未設定）
pub struct Identity(pub RequestIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .map(Identity)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
