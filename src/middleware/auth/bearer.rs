//! `Authorization: Bearer <token>` の取り出し
//!
//! The scheme prefix is matched exactly (case-sensitive, one space);
//! deployed clients depend on this.

use axum::http::{HeaderMap, header};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Candidate token from the `Authorization` header, if any.
///
/// Returns `None` when the header is absent, not visible ASCII, or uses
/// another scheme. No validation happens here.
pub fn extract(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}
