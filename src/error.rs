/*
 * Responsibility
 * - アプリ共通の AppError 定義 (IntoResponse → `{"error": {code, message}}`)
 * - 認証失敗の ResponseWriter (`{status, code, message}` envelope)
 * - 認可失敗 (403) は envelope を使わず plain message を返す
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::audit::AuditError;
use crate::services::auth::error_code::{AuthErrorKind, lookup, status_name};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        tracing::error!(error = %e, "audit log could not be written");
        AppError::Internal
    }
}

/// Wire shape of every authentication rejection.
#[derive(Debug, Serialize)]
pub struct AuthErrorEnvelope {
    pub status: String,
    pub code: u16,
    pub message: &'static str,
}

/// Terminal rejection produced by the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRejection(pub AuthErrorKind);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        write_error(self.0)
    }
}

/// Render an auth failure.
///
/// Authentication kinds use the `{status, code, message}` envelope;
/// `AuthorizationDenied` is written as a bare message under the same content type.
pub fn write_error(kind: AuthErrorKind) -> Response {
    let entry = lookup(kind);

    if !kind.uses_envelope() {
        return with_json_utf8(entry.status, entry.message.into());
    }

    let envelope = AuthErrorEnvelope {
        status: status_name(entry.status),
        code: entry.status.as_u16(),
        message: entry.message,
    };

    match serde_json::to_string(&envelope) {
        Ok(body) => with_json_utf8(entry.status, body),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize auth error envelope");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn with_json_utf8(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_string(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn envelope_carries_status_name_code_and_message() {
        let res = write_error(AuthErrorKind::TokenRequired);

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()[header::CONTENT_TYPE], JSON_UTF8);

        let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(body["status"], "BAD_REQUEST");
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "A JWT token is required.");
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn expired_token_renders_unauthorized() {
        let res = AuthRejection(AuthErrorKind::ExpiredToken).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(body["status"], "UNAUTHORIZED");
        assert_eq!(body["code"], 401);
    }

    #[tokio::test]
    async fn authorization_denied_is_a_bare_message() {
        let res = write_error(AuthErrorKind::AuthorizationDenied);

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()[header::CONTENT_TYPE], JSON_UTF8);
        assert_eq!(
            body_string(res).await,
            "Administrator privileges are required."
        );
    }

    #[tokio::test]
    async fn app_error_keeps_error_object_shape() {
        let res = AppError::bad_request("INVALID_BODY", "unreadable").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_BODY");
        assert_eq!(body["error"]["message"], "unreadable");
    }
}
