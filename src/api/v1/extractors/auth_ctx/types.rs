/*
 * Responsibility
 * - Handler から見える「認証結果」の型
 * - middleware が Principal を request extensions に格納し、handler は AuthOutcome / RequirePrincipal で受け取る
 */

use std::net::SocketAddr;

pub use crate::services::principal::Principal;

/// Request details recorded alongside an authenticated `Principal`.
///
/// `remote_addr` is `None` unless the server was started with `ConnectInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthDetails {
    pub remote_addr: Option<SocketAddr>,
}

/// Per-request authentication result. Never both at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Principal),
    Unauthenticated,
}

impl AuthOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(p) => Some(p),
            Self::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<Option<Principal>> for AuthOutcome {
    fn from(p: Option<Principal>) -> Self {
        p.map_or(Self::Unauthenticated, Self::Authenticated)
    }
}
