/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (auth gate / access log / transport)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, http::StatusCode, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::Config;
use crate::middleware::{self, auth::PathPolicy};
use crate::services::audit::{LogSink, TracingLogSink};
use crate::services::auth::build_claims_codec;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,audit=info,access=info,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get "lost".
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, keep serving other requests.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        bypass = ?config.bypass_prefixes,
        privileged = ?config.privileged_prefixes,
        "starting gatekeeper in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config, Arc::new(TracingLogSink));
    let app = build_router(state.clone(), api::v1::routes(&state));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services once and share them read-only.
pub fn build_state(config: &Config, log_sink: Arc<dyn LogSink>) -> AppState {
    let codec = build_claims_codec(config);
    AppState::new(codec, PathPolicy::from_config(config), log_sink)
}

/// Put `api` behind the auth gate and access log, then add transport layers.
///
/// `/health` stays outside the gate. Unknown paths are gated like any other.
pub fn build_router(state: AppState, api: Router<AppState>) -> Router {
    let gated = api.fallback(|| async { StatusCode::NOT_FOUND });
    // layer order: gate (outer) → access log → handler
    let gated = middleware::access_log::apply(gated, state.clone());
    let gated = middleware::auth::access::apply(gated, state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .merge(gated)
        .with_state(state);

    middleware::http::apply(router)
}
