/*
 * Responsibility
 * - GET /me    : Principal 必須 (未認証なら 401)
 * - GET /hello : 匿名でも可、認証済みなら名前を返す
 */
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::v1::extractors::{AuthDetails, AuthOutcome, RequirePrincipal};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub authorities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub authenticated: bool,
}

pub async fn me(
    RequirePrincipal(principal): RequirePrincipal,
    details: Option<Extension<AuthDetails>>,
) -> Json<MeResponse> {
    let remote_addr = details
        .and_then(|Extension(d)| d.remote_addr)
        .map(|addr| addr.to_string());

    Json(MeResponse {
        username: principal.username,
        authorities: principal.authorities,
        remote_addr,
    })
}

pub async fn hello(outcome: AuthOutcome) -> Json<HelloResponse> {
    let name = outcome
        .principal()
        .map(|p| p.username.as_str())
        .unwrap_or("anonymous");

    Json(HelloResponse {
        message: format!("hello, {name}"),
        authenticated: outcome.is_authenticated(),
    })
}
