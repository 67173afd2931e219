use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::services::auth::token_codec::{TokenCodec, TokenError};

/// Verification failed.
///
/// The message is deliberately generic; the specific cause is only
/// available through [`VerificationError::reason`] for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("invalid bearer token")]
pub struct VerificationError {
    reason: TokenError,
}

impl VerificationError {
    pub fn reason(&self) -> &TokenError {
        &self.reason
    }
}

/// Validates bearer tokens and yields the subject they were issued for.
#[derive(Clone, Debug)]
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
}

impl TokenVerifier {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn verify(&self, token: &str) -> Result<String, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, VerificationError> {
        match self.codec.decode_at(token, now) {
            Ok(claims) => Ok(claims.sub),
            Err(reason) => {
                match &reason {
                    TokenError::TokenExpired => {
                        info!(reason = reason.kind(), "bearer token expired");
                    }
                    other => {
                        warn!(reason = other.kind(), detail = %other, "bearer token rejected");
                    }
                }
                Err(VerificationError { reason })
            }
        }
    }
}
