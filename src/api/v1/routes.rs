/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証 middleware は app.rs で v1 全体に掛ける (匿名でも通過する)
 * - Principal が必要かどうかは handler の extractor で決める
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    me::{hello, me},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/hello", get(hello))
        .route("/me", get(me))
}
