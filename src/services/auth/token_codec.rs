//! Signed session tokens (HS256 JWT).
//!
//! Wire format: `base64url(header).base64url(claims).base64url(signature)`
//! with header `{"typ":"JWT","alg":"HS256"}` and claims `{sub, iat, exp}`
//! (Unix seconds). The algorithm is fixed on both sides; whatever the
//! token header claims is checked against it, never used to pick one.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HMAC-SHA256 needs at least 256 bits of key material.
pub const MIN_SECRET_BYTES: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Why a token could not be issued or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("token signature does not match")]
    SignatureMismatch,
    #[error("token expired")]
    TokenExpired,
    #[error("unsupported token format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to encode token: {0}")]
    EncodingError(String),
}

impl TokenError {
    /// Short, stable label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed",
            Self::SignatureMismatch => "signature_mismatch",
            Self::TokenExpired => "expired",
            Self::UnsupportedFormat(_) => "unsupported",
            Self::EncodingError(_) => "encoding",
        }
    }
}

/// Signing key could not be built from configuration.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("signing secret is not valid base64")]
    InvalidSecret,
    #[error("signing secret must decode to at least {min} bytes (got {0})", min = MIN_SECRET_BYTES)]
    WeakSecret(usize),
    #[error("token ttl must be greater than zero")]
    InvalidTtl,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and decodes tokens with one process-wide symmetric key.
///
/// Keys are derived once in [`TokenCodec::new`]; the codec is immutable
/// afterwards and can be shared behind an `Arc` across requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    /// `secret_b64` is the standard-alphabet base64 encoding of the key.
    pub fn new(secret_b64: &str, ttl: Duration) -> Result<Self, CodecError> {
        let secret = STANDARD
            .decode(secret_b64.trim())
            .map_err(|_| CodecError::InvalidSecret)?;
        Self::from_secret(&secret, ttl)
    }

    pub fn from_secret(secret: &[u8], ttl: Duration) -> Result<Self, CodecError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(CodecError::WeakSecret(secret.len()));
        }
        if ttl.is_zero() {
            return Err(CodecError::InvalidTtl);
        }

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked in `decode_at` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Default time-to-live from configuration.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.ttl)
    }

    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| TokenError::EncodingError(format!("ttl out of range: {e}")))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::EncodingError("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let mut header = Header::new(ALGORITHM);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify `token` and return its claims, treating `now` as the current time.
    ///
    /// Structure and algorithm are checked first, then the signature, then
    /// expiry (`now >= exp` is expired).
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        inspect_segments(token)?;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::MalformedToken("empty 'sub' claim".to_string()));
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

// Structural pre-check so that an unknown `alg` is reported as unsupported
// instead of a generic parse failure.
fn inspect_segments(token: &str) -> Result<(), TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(_payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let header_json = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::MalformedToken("header is not base64url".to_string()))?;
    let header: RawHeader = serde_json::from_slice(&header_json)
        .map_err(|_| TokenError::MalformedToken("header is not valid JSON".to_string()))?;

    if header.alg != ALGORITHM_NAME {
        return Err(TokenError::UnsupportedFormat(format!(
            "algorithm '{}' is not accepted",
            header.alg
        )));
    }

    if URL_SAFE_NO_PAD.decode(signature).is_err() {
        return Err(TokenError::SignatureMismatch);
    }

    Ok(())
}

fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::UnsupportedFormat(e.to_string())
        }
        _ => TokenError::MalformedToken(e.to_string()),
    }
}
