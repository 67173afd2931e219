/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (401 は unauthorized responder、それ以外は JSON error body)
 * - 起動時エラー (config / signing key / db / bind) もここに集約
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::middleware::auth::unauthorized;
use crate::services::auth::CodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Unauthorized { message: String, path: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid signing configuration: {0}")]
    SigningKey(#[from] CodecError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized { message, path } => unauthorized(&message, &path),
            other => {
                tracing::error!(error = %other, "internal error");
                let body = ErrorResponse {
                    error: ErrorBody {
                        code: "INTERNAL_SERVER_ERROR",
                        message: "internal server error".into(),
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn unauthorized_uses_fixed_body() {
        let res = AppError::unauthorized("nope", "/api/v1/me").into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": 401, "error": "Unauthorized", "message": "nope", "path": "/api/v1/me"})
        );
    }

    #[tokio::test]
    async fn other_errors_do_not_leak_detail() {
        let res = AppError::from(ConfigError::Missing("JWT_SECRET")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(!text.contains("JWT_SECRET"));
        assert!(text.contains("INTERNAL_SERVER_ERROR"));
    }
}
