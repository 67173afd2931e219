use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request},
    http::{StatusCode, header},
    response::Response,
    routing::get,
};
use chrono::{TimeDelta, Utc};
use serde_json::Value;
use tower::ServiceExt;

use stateless_auth::app::build_router;
use stateless_auth::middleware::auth::access;
use stateless_auth::middleware::http::HttpLimits;
use stateless_auth::services::auth::{TokenCodec, TokenVerifier};
use stateless_auth::services::principal::{
    BoxFuture, InMemoryPrincipals, LookupError, Principal, PrincipalLookup,
};
use stateless_auth::state::AppState;

const SECRET: &[u8] = b"integration-test-secret-0123456789";

struct FailingLookup;

impl PrincipalLookup for FailingLookup {
    fn lookup_principal<'a>(
        &'a self,
        _subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<Principal>, LookupError>> {
        Box::pin(async { Err(LookupError::Other("backend unavailable".to_string())) })
    }
}

struct PanickingLookup;

impl PrincipalLookup for PanickingLookup {
    fn lookup_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<Principal>, LookupError>> {
        Box::pin(async move {
            if subject.is_empty() {
                return Ok(None);
            }
            panic!("driver bug")
        })
    }
}

fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::from_secret(SECRET, Duration::from_secs(600)).unwrap())
}

fn state_with(codec: Arc<TokenCodec>, principals: Arc<dyn PrincipalLookup>) -> AppState {
    AppState::new(TokenVerifier::new(codec), principals)
}

fn default_state(codec: Arc<TokenCodec>) -> AppState {
    let principals = InMemoryPrincipals::new()
        .with("alice", &["ROLE_USER", "ROLE_ADMIN"])
        .with("bob", &["ROLE_USER"]);
    state_with(codec, Arc::new(principals))
}

fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Response) {
    let res = app.oneshot(req).await.unwrap();
    (res.status(), res)
}

async fn json_body(res: Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn valid_token_attaches_principal() {
    let codec = codec();
    let token = codec.issue("alice", Duration::from_secs(60)).unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    let (status, res) = call(
        app,
        get_request("/api/v1/me", Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(
        body["authorities"],
        serde_json::json!(["ROLE_USER", "ROLE_ADMIN"])
    );
}

#[tokio::test]
async fn missing_token_on_protected_route_gets_fixed_401() {
    let app = build_router(default_state(codec()), HttpLimits::default());

    let (status, res) = call(app, get_request("/api/v1/me", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        std::str::from_utf8(&bytes).unwrap(),
        r#"{"status":401,"error":"Unauthorized","message":"Full authentication is required to access this resource","path":"/api/v1/me"}"#
    );
}

#[tokio::test]
async fn expired_token_degrades_to_anonymous() {
    let codec = codec();
    let token = codec
        .issue_at(
            "alice",
            Duration::from_secs(60),
            Utc::now() - TimeDelta::seconds(120),
        )
        .unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    let (status, res) = call(
        app.clone(),
        get_request("/api/v1/hello", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["message"], "hello, anonymous");

    let (status, _) = call(
        app,
        get_request("/api/v1/me", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn optional_route_greets_authenticated_principal() {
    let codec = codec();
    let token = codec.issue("bob", Duration::from_secs(60)).unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    let (status, res) = call(
        app,
        get_request("/api/v1/hello", Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["message"], "hello, bob");
}

#[tokio::test]
async fn forged_or_foreign_tokens_are_anonymous() {
    let codec = codec();
    let foreign = TokenCodec::from_secret(b"some-other-secret-0123456789abcdef", Duration::from_secs(60))
        .unwrap()
        .issue("alice", Duration::from_secs(60))
        .unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    for authorization in [
        format!("Bearer {foreign}"),
        "Bearer not-a-token".to_string(),
        "Bearer ".to_string(),
        "Basic YWxpY2U6cGFzc3dvcmQ=".to_string(),
    ] {
        let (status, res) = call(
            app.clone(),
            get_request("/api/v1/hello", Some(&authorization)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "authorization {authorization:?}");
        assert_eq!(json_body(res).await["authenticated"], false);
    }
}

#[tokio::test]
async fn unknown_subject_is_anonymous() {
    let codec = codec();
    let token = codec.issue("mallory", Duration::from_secs(60)).unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    let (status, _) = call(
        app,
        get_request("/api/v1/me", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn lookup_failure_does_not_fail_the_request() {
    let codec = codec();
    let token = codec.issue("alice", Duration::from_secs(60)).unwrap();
    let app = build_router(
        state_with(codec, Arc::new(FailingLookup)),
        HttpLimits::default(),
    );

    let (status, res) = call(
        app,
        get_request("/api/v1/hello", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(res).await["authenticated"], false);
}

#[tokio::test]
async fn panicking_lookup_degrades_to_anonymous() {
    let codec = codec();
    let token = codec.issue("alice", Duration::from_secs(60)).unwrap();
    let app = build_router(
        state_with(codec, Arc::new(PanickingLookup)),
        HttpLimits::default(),
    );

    let (status, res) = call(
        app.clone(),
        get_request("/api/v1/hello", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(res).await["authenticated"], false);

    // The server keeps answering after the failed lookup.
    let (status, _) = call(
        app,
        get_request("/api/v1/me", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn peer_address_is_recorded_with_principal() {
    let codec = codec();
    let token = codec.issue("alice", Duration::from_secs(60)).unwrap();
    let app = build_router(default_state(codec), HttpLimits::default());

    let peer: SocketAddr = "203.0.113.7:51234".parse().unwrap();
    let mut req = get_request("/api/v1/me", Some(&format!("Bearer {token}")));
    req.extensions_mut().insert(ConnectInfo(peer));

    let (status, res) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(res).await["remote_addr"], "203.0.113.7:51234");

    // Without ConnectInfo the field is omitted.
    let (status, res) = call(
        app,
        get_request("/api/v1/me", Some(&format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json_body(res).await.get("remote_addr").is_none());
}

#[tokio::test]
async fn public_route_is_reachable_without_token() {
    let app = build_router(default_state(codec()), HttpLimits::default());

    let (status, res) = call(app, get_request("/api/v1/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(res).await["status"], "ok");
}

#[tokio::test]
async fn middleware_always_runs_next_exactly_once() {
    let codec = codec();
    let valid = codec.issue("alice", Duration::from_secs(60)).unwrap();
    let state = default_state(codec);

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let inner: Router<AppState> = Router::new().route(
        "/whoami",
        get(move |req: Request| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                req.extensions()
                    .get::<Principal>()
                    .map(|p| p.username.clone())
                    .unwrap_or_default()
            }
        }),
    );
    let app: Router = access::apply(inner, state.clone()).with_state(state);

    let cases = [
        (Some(format!("Bearer {valid}")), "alice"),
        (None, ""),
        (Some("Bearer garbage".to_string()), ""),
    ];
    for (i, (authorization, expected)) in cases.into_iter().enumerate() {
        let res = app
            .clone()
            .oneshot(get_request("/whoami", authorization.as_deref()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), expected);
        assert_eq!(hits.load(Ordering::SeqCst), i + 1);
    }
}
