use serde::Serialize;

/// Resolved identity attached to an authenticated request.
///
/// - `username` is the token subject as resolved by the lookup
/// - `authorities` are coarse-grained grants (e.g. `ROLE_ADMIN`); deciding
///   what they allow is left to handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new(username: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}
