//! bearer token 検証 → Principal を extensions に入れる
//!
//! Runs before every request and never rejects on its own:
//! - no `Authorization: Bearer` header → unauthenticated
//! - token fails verification → unauthenticated (logged)
//! - subject unknown, lookup error or lookup panic → unauthenticated (logged)
//! - otherwise the resolved `Principal` is inserted into request extensions,
//!   together with `AuthDetails` (peer address when served with `ConnectInfo`)
//!
//! Handlers that require an identity use `RequirePrincipal`, which answers
//! with the 401 responder when nothing was attached.

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::{AuthDetails, AuthOutcome};
use crate::middleware::auth::bearer;
use crate::state::AppState;

/// ルータ全体に認証 middleware を適用する。
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

pub async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!(uri = %req.uri(), "authentication middleware invoked");

    if let AuthOutcome::Authenticated(principal) = authenticate(&state, req.headers()).await {
        let remote_addr = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        // middleware → extractor への受け渡し
        req.extensions_mut().insert(principal);
        req.extensions_mut().insert(AuthDetails { remote_addr });
    }

    next.run(req).await
}

/// Resolve the request's identity. Every failure degrades to `Unauthenticated`.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> AuthOutcome {
    let Some(token) = bearer::extract(headers) else {
        return AuthOutcome::Unauthenticated;
    };

    let subject = match state.verifier.verify(token) {
        Ok(subject) => subject,
        Err(err) => {
            // The verifier already logged the cause at its own level.
            tracing::debug!(
                reason = err.reason().kind(),
                "continuing unauthenticated"
            );
            return AuthOutcome::Unauthenticated;
        }
    };

    // Runs on its own task: a panicking lookup surfaces as a JoinError here
    // instead of unwinding through the request.
    let principals = state.principals.clone();
    let lookup_subject = subject.clone();
    let lookup = tokio::spawn(async move {
        principals.lookup_principal(&lookup_subject).await
    })
    .await;

    let result = match lookup {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(subject = %subject, error = %err, "principal lookup task failed; continuing unauthenticated");
            return AuthOutcome::Unauthenticated;
        }
    };

    match result {
        Ok(Some(principal)) => {
            tracing::debug!(subject = %subject, "request authenticated");
            AuthOutcome::Authenticated(principal)
        }
        Ok(None) => {
            tracing::warn!(subject = %subject, "token subject not found; continuing unauthenticated");
            AuthOutcome::Unauthenticated
        }
        Err(err) => {
            tracing::warn!(subject = %subject, error = %err, "principal lookup failed; continuing unauthenticated");
            AuthOutcome::Unauthenticated
        }
    }
}
