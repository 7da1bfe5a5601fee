/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route 毎の metadata (privileged / body capture) を登録時に決める
 * - privileged な route はここで audit adapter に包む (呼び出し時には判断しない)
 */
use std::sync::Arc;

use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

use crate::api::v1::handlers::{admin::echo, me::me};
use crate::middleware::audit;
use crate::services::audit::AuditRecorder;
use crate::state::AppState;

/// Registration metadata for one route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Calls are recorded by the audit trail.
    pub privileged: bool,
    /// The request body is the payload logged for a privileged call.
    pub capture_body: bool,
}

impl RouteMeta {
    pub const fn public() -> Self {
        Self {
            privileged: false,
            capture_body: false,
        }
    }

    pub const fn privileged() -> Self {
        Self {
            privileged: true,
            capture_body: false,
        }
    }

    pub const fn with_body(mut self) -> Self {
        self.capture_body = true;
        self
    }
}

/// Router builder that applies [`RouteMeta`] at registration time.
pub struct RouteTable {
    router: Router<AppState>,
    recorder: Arc<AuditRecorder>,
}

impl RouteTable {
    pub fn new(recorder: Arc<AuditRecorder>) -> Self {
        Self {
            router: Router::new(),
            recorder,
        }
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter<AppState>, meta: RouteMeta) -> Self {
        let method_router = if meta.privileged {
            audit::wrap(method_router, self.recorder.clone(), meta.capture_body)
        } else {
            method_router
        };
        self.router = self.router.route(path, method_router);
        self
    }

    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}

pub fn routes(state: &AppState) -> Router<AppState> {
    RouteTable::new(state.recorder.clone())
        .route("/me", get(me), RouteMeta::public())
        .route("/admin/echo", post(echo), RouteMeta::privileged().with_body())
        .into_router()
}
