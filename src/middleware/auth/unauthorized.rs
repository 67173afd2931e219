//! 401 レスポンスの唯一の出口
//!
//! Body shape is fixed regardless of cause:
//! `{"status":401,"error":"Unauthorized","message":<message>,"path":<path>}`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message used when a protected handler is reached without a principal.
pub const AUTHENTICATION_REQUIRED: &str = "Full authentication is required to access this resource";

// Field order is part of the wire contract.
#[derive(Debug, Serialize)]
struct UnauthorizedBody<'a> {
    status: u16,
    error: &'static str,
    message: &'a str,
    path: &'a str,
}

/// Build the 401 response. `message` is passed through verbatim.
pub fn unauthorized(message: &str, path: &str) -> Response {
    let body = UnauthorizedBody {
        status: StatusCode::UNAUTHORIZED.as_u16(),
        error: "Unauthorized",
        message,
        path,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header;

    use super::*;

    #[tokio::test]
    async fn body_has_fixed_shape() {
        let res = unauthorized("Full authentication is required", "/api/secret");

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"{"status":401,"error":"Unauthorized","message":"Full authentication is required","path":"/api/secret"}"#
        );
    }

    #[tokio::test]
    async fn message_is_escaped_not_rewritten() {
        let res = unauthorized(r#"bad "quote""#, "/p");
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["message"], r#"bad "quote""#);
        assert_eq!(value["path"], "/p");
    }
}
