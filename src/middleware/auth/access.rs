//! Bearer token 検証 → RequestIdentity を extensions に入れる (auth gate)
//!
//! Order per request:
//! 1. bypass prefix → forward, no token needed
//! 2. `Authorization` header missing → TOKEN_REQUIRED
//! 3. strip `Bearer `, decode + validate claims (codec failure kind is returned as-is)
//! 4. privileged prefix without the admin role → 403 with a bare message,
//!    identity is carried on the response extensions
//! 5. forward with identity in the request extensions
//!
//! A rejection is written here and the handler chain is never entered.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::RequestIdentity;
use crate::error::write_error;
use crate::middleware::auth::policy::PathPolicy;
use crate::services::auth::{AuthErrorKind, ClaimsCodec};
use crate::state::AppState;

/// Outcome of running the gate over one request's path and header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Bypass,
    Forward(RequestIdentity),
    /// Authenticated, but the path needs the admin role.
    Denied(RequestIdentity),
    Rejected(AuthErrorKind),
}

/// 認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let api = api::v1::routes(&state);
/// let api = middleware::auth::access::apply(api, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, auth_gate))
}

pub fn evaluate(
    codec: &ClaimsCodec,
    policy: &PathPolicy,
    path: &str,
    authorization: Option<&HeaderValue>,
) -> GateDecision {
    if policy.is_bypassed(path) {
        return GateDecision::Bypass;
    }

    let Some(authorization) = authorization else {
        return GateDecision::Rejected(AuthErrorKind::TokenRequired);
    };

    // Present but not visible ASCII: treat like any other undecodable token.
    let Ok(raw) = authorization.to_str() else {
        tracing::warn!(path, "authorization header is not valid ascii");
        return GateDecision::Rejected(AuthErrorKind::InvalidToken);
    };

    let claims = match codec.decode(raw) {
        Ok(claims) => claims,
        Err(err) => {
            let kind = err.kind();
            tracing::warn!(error = ?err, kind = %kind, path, "access token verification failed");
            return GateDecision::Rejected(kind);
        }
    };

    let identity = RequestIdentity::from(claims);

    if !policy.permits(path, identity.user_role) {
        return GateDecision::Denied(identity);
    }

    GateDecision::Forward(identity)
}

async fn auth_gate(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let path = request_path(&req);
    let decision = evaluate(
        &state.codec,
        &state.policy,
        &path,
        req.headers().get(header::AUTHORIZATION),
    );

    match decision {
        GateDecision::Bypass => next.run(req).await,
        GateDecision::Forward(identity) => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        GateDecision::Denied(identity) => {
            tracing::warn!(
                user_id = identity.user_id,
                user_role = %identity.user_role,
                path = %path,
                "privileged path requires admin role"
            );
            let mut res = write_error(AuthErrorKind::AuthorizationDenied);
            // Outer layers (trace/access) still see who was denied.
            res.extensions_mut().insert(identity);
            res
        }
        GateDecision::Rejected(kind) => write_error(kind),
    }
}

/// Full request path, even when the router is nested.
pub(crate) fn request_path<B>(req: &Request<B>) -> String {
    req.extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path())
        .unwrap_or_else(|| req.uri().path())
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::get;
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::config::SigningConfig;
    use crate::services::audit::TracingLogSink;
    use crate::services::auth::{Claims, UserRole};

    fn codec() -> ClaimsCodec {
        ClaimsCodec::new(&SigningConfig {
            secret: b"gate-unit-secret".to_vec(),
            leeway_seconds: 0,
            ttl_seconds: 600,
        })
    }

    fn bearer(codec: &ClaimsCodec, role: UserRole) -> HeaderValue {
        let token = codec
            .issue(5, Some("five@example.com".to_string()), role)
            .unwrap();
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    #[test]
    fn bypass_ignores_the_header_entirely() {
        let codec = codec();
        let policy = PathPolicy::default();
        let junk = HeaderValue::from_static("Bearer junk");

        assert_eq!(evaluate(&codec, &policy, "/auth/signin", None), GateDecision::Bypass);
        assert_eq!(
            evaluate(&codec, &policy, "/auth/signin", Some(&junk)),
            GateDecision::Bypass
        );
    }

    #[test]
    fn missing_header_requires_token() {
        assert_eq!(
            evaluate(&codec(), &PathPolicy::default(), "/todos", None),
            GateDecision::Rejected(AuthErrorKind::TokenRequired)
        );
    }

    #[test]
    fn non_ascii_header_is_an_invalid_token() {
        let value = HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap();
        assert_eq!(
            evaluate(&codec(), &PathPolicy::default(), "/todos", Some(&value)),
            GateDecision::Rejected(AuthErrorKind::InvalidToken)
        );
    }

    #[test]
    fn codec_failure_kind_is_passed_through() {
        let codec = codec();
        let expired = codec
            .encode(&Claims {
                user_id: 5,
                email: None,
                role: UserRole::User,
                issued_at: None,
                expires_at: Utc::now() - Duration::minutes(5),
            })
            .unwrap();
        let value = HeaderValue::from_str(&format!("Bearer {expired}")).unwrap();

        assert_eq!(
            evaluate(&codec, &PathPolicy::default(), "/todos", Some(&value)),
            GateDecision::Rejected(AuthErrorKind::ExpiredToken)
        );
    }

    #[test]
    fn user_role_is_denied_on_privileged_path_with_identity() {
        let codec = codec();
        let value = bearer(&codec, UserRole::User);

        let GateDecision::Denied(identity) =
            evaluate(&codec, &PathPolicy::default(), "/admin/users", Some(&value))
        else {
            panic!("expected denial");
        };
        assert_eq!(identity.user_id, 5);
        assert_eq!(identity.user_role, UserRole::User);
    }

    #[test]
    fn admin_role_is_forwarded_with_identity() {
        let codec = codec();
        let value = bearer(&codec, UserRole::Admin);

        assert_eq!(
            evaluate(&codec, &PathPolicy::default(), "/admin/users", Some(&value)),
            GateDecision::Forward(RequestIdentity {
                user_id: 5,
                user_role: UserRole::Admin,
                email: Some("five@example.com".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn denied_response_carries_the_identity() {
        let codec = Arc::new(codec());
        let authorization = bearer(&codec, UserRole::User);
        let state = AppState::new(codec, PathPolicy::default(), Arc::new(TracingLogSink));
        let routes = Router::new().route("/admin/users", get(|| async { "hidden" }));
        let router = apply(routes, state.clone()).with_state(state);

        let req = Request::builder()
            .uri("/admin/users")
            .header(header::AUTHORIZATION, authorization)
            .body(Body::empty())
            .unwrap();
        let res = router.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let identity = res.extensions().get::<RequestIdentity>().unwrap();
        assert_eq!(identity.user_id, 5);
        assert_eq!(identity.user_role, UserRole::User);
    }
}
