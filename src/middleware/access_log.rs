//! Per-request access log.
//!
//! Runs after the auth gate has forwarded a request and before the handler.
//! It never sees gate rejections; identity fields are empty on bypass paths.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::RequestIdentity;
use crate::middleware::auth::access::request_path;
use crate::services::audit::{AccessRecord, LogEvent};
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_log))
}

async fn access_log(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let identity = req.extensions().get::<RequestIdentity>();

    state.log_sink.emit(LogEvent::Access(AccessRecord {
        user_id: identity.map(|i| i.user_id),
        user_role: identity.map(|i| i.user_role),
        email: identity.and_then(|i| i.email.clone()),
        method: req.method().to_string(),
        path: request_path(&req),
        timestamp: Utc::now(),
    }));

    next.run(req).await
}
