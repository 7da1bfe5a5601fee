//! HTTP adapter that runs [`AuditRecorder`] around a privileged route.
//!
//! Responsibility:
//! - buffer the request body once (when the route declares one) and hand the
//!   handler an identical body
//! - buffer the handler's response and rebuild it unchanged
//! - error responses (4xx/5xx) pass through without a response record
//!
//! Applied per route at registration time, see `api::v1::routes`.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::State,
    http::{Request, response},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::{Serialize, Serializer, ser::Error as _};

use crate::api::v1::extractors::RequestIdentity;
use crate::error::AppError;
use crate::middleware::auth::access::request_path;
use crate::services::audit::{AuditContext, AuditError, AuditRecorder};
use crate::state::AppState;

/// Request bodies larger than this are refused before the handler runs.
pub const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, Clone)]
struct AuditLayerState {
    recorder: Arc<AuditRecorder>,
    capture_body: bool,
}

/// Wrap `route` so every call is recorded by `recorder`.
pub fn wrap(
    route: MethodRouter<AppState>,
    recorder: Arc<AuditRecorder>,
    capture_body: bool,
) -> MethodRouter<AppState> {
    let state = AuditLayerState {
        recorder,
        capture_body,
    };
    route.layer(middleware::from_fn_with_state(state, audit))
}

/// Raw HTTP body as it appears in the audit log.
///
/// JSON bodies are logged as JSON, other UTF-8 text as a string, an empty body
/// as `null`. Anything else cannot be represented and fails serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedBody(pub Bytes);

impl Serialize for CapturedBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            return serializer.serialize_none();
        }
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.0) {
            return value.serialize(serializer);
        }
        match std::str::from_utf8(&self.0) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => Err(S::Error::custom("body is neither JSON nor UTF-8 text")),
        }
    }
}

struct CapturedResponse {
    parts: response::Parts,
    body: CapturedBody,
}

impl Serialize for CapturedResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

impl IntoResponse for CapturedResponse {
    fn into_response(self) -> Response {
        Response::from_parts(self.parts, Body::from(self.body.0))
    }
}

enum AuditFailure {
    Audit(AuditError),
    Handler(Response),
    Body(AppError),
}

impl From<AuditError> for AuditFailure {
    fn from(e: AuditError) -> Self {
        Self::Audit(e)
    }
}

impl IntoResponse for AuditFailure {
    fn into_response(self) -> Response {
        match self {
            Self::Audit(e) => AppError::from(e).into_response(),
            Self::Handler(res) => res,
            Self::Body(e) => e.into_response(),
        }
    }
}

async fn audit(State(layer): State<AuditLayerState>, req: Request<Body>, next: Next) -> Response {
    let identity = req.extensions().get::<RequestIdentity>();
    let ctx = AuditContext {
        user_id: identity.map(|i| i.user_id),
        user_role: identity.map(|i| i.user_role),
        url: request_path(&req),
    };

    let (parts, body) = req.into_parts();
    let (req, captured) = if layer.capture_body {
        let bytes = match to_bytes(body, BODY_LIMIT).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, url = %ctx.url, "privileged request body could not be read");
                return AppError::bad_request("INVALID_BODY", "request body could not be read")
                    .into_response();
            }
        };
        (
            Request::from_parts(parts, Body::from(bytes.clone())),
            Some(CapturedBody(bytes)),
        )
    } else {
        (Request::from_parts(parts, body), None)
    };

    let outcome = layer
        .recorder
        .record(&ctx, captured.as_ref(), async move {
            let res = next.run(req).await;
            let status = res.status();
            if status.is_client_error() || status.is_server_error() {
                return Err(AuditFailure::Handler(res));
            }

            let (parts, body) = res.into_parts();
            let bytes = to_bytes(body, usize::MAX).await.map_err(|err| {
                tracing::error!(error = %err, "privileged response body could not be read");
                AuditFailure::Body(AppError::Internal)
            })?;

            Ok(CapturedResponse {
                parts,
                body: CapturedBody(bytes),
            })
        })
        .await;

    match outcome {
        Ok(captured) => captured.into_response(),
        Err(failure) => failure.into_response(),
    }
}
