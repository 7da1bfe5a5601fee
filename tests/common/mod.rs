//! Shared helpers for router-level tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use chrono::{Duration, Utc};
use gatekeeper::{
    app::build_router,
    config::SigningConfig,
    middleware::auth::PathPolicy,
    services::audit::{LogEvent, LogSink},
    services::auth::{Claims, ClaimsCodec, UserRole},
    state::AppState,
};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

#[derive(Debug, Default)]
pub struct CaptureSink(Mutex<Vec<LogEvent>>);

impl LogSink for CaptureSink {
    fn emit(&self, event: LogEvent) {
        self.0.lock().unwrap().push(event);
    }
}

impl CaptureSink {
    pub fn events(&self) -> Vec<LogEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn access(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, LogEvent::Access(_)))
            .count()
    }

    pub fn audit(&self) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, LogEvent::Access(_)))
            .collect()
    }
}

pub struct TestApp {
    pub router: Router,
    pub codec: Arc<ClaimsCodec>,
    pub sink: Arc<CaptureSink>,
}

pub fn signing() -> SigningConfig {
    SigningConfig {
        secret: SECRET.as_bytes().to_vec(),
        leeway_seconds: 0,
        ttl_seconds: 600,
    }
}

/// Assemble the production middleware stack around test routes.
pub fn spawn_app(routes: impl FnOnce(&AppState) -> Router<AppState>) -> TestApp {
    let codec = Arc::new(ClaimsCodec::new(&signing()));
    let sink = Arc::new(CaptureSink::default());
    let state = AppState::new(codec.clone(), PathPolicy::default(), sink.clone());
    let api = routes(&state);

    TestApp {
        router: build_router(state, api),
        codec,
        sink,
    }
}

impl TestApp {
    pub fn token(&self, user_id: i64, role: UserRole) -> String {
        self.codec
            .issue(user_id, Some(format!("user{user_id}@example.com")), role)
            .unwrap()
    }

    pub fn expired_token(&self, user_id: i64, role: UserRole) -> String {
        self.codec
            .encode(&Claims {
                user_id,
                email: None,
                role,
                issued_at: None,
                expires_at: Utc::now() - Duration::minutes(30),
            })
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, body)
    }
}

pub fn get(path: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(path: &str, authorization: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", authorization)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json(body: &Bytes) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}
