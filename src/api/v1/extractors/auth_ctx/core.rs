use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::auth::AUTHENTICATION_REQUIRED;

use super::{AuthOutcome, Principal};

/// 認証の有無にかかわらず使える extractor (匿名アクセス可の handler 向け)
impl<S> FromRequestParts<S> for AuthOutcome
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().into())
    }
}

/// Principal 必須の handler 向け extractor
/// middleware が Principal を request.extensions() に insert 済みである前提
/// 見つからない場合は unauthorized responder で 401 を返す
#[derive(Debug, Clone)]
pub struct RequirePrincipal(pub Principal);

impl<S> FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(RequirePrincipal(principal.clone()));
        }

        // Report the path the client asked for, not the one seen inside a nested router.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Err(AppError::unauthorized(AUTHENTICATION_REQUIRED, path))
    }
}
