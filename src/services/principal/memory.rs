use std::collections::HashMap;

use super::{BoxFuture, LookupError, Principal, PrincipalLookup};

/// Fixed set of principals held in memory.
///
/// Used when no database is configured, and by tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrincipals {
    principals: HashMap<String, Principal>,
}

impl InMemoryPrincipals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, username: &str, authorities: &[&str]) -> Self {
        self.insert(Principal::new(
            username,
            authorities.iter().map(|a| a.to_string()).collect(),
        ));
        self
    }

    pub fn insert(&mut self, principal: Principal) {
        self.principals.insert(principal.username.clone(), principal);
    }

    /// Parse `alice:ROLE_USER|ROLE_ADMIN,bob:ROLE_USER`.
    ///
    /// Entries without a username are skipped; a bare `carol` gets no authorities.
    pub fn parse(spec: &str) -> Self {
        let mut store = Self::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (username, authorities) = entry.split_once(':').unwrap_or((entry, ""));
            let username = username.trim();
            if username.is_empty() {
                continue;
            }
            let authorities = authorities
                .split('|')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            store.insert(Principal::new(username, authorities));
        }
        store
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl PrincipalLookup for InMemoryPrincipals {
    fn lookup_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<Principal>, LookupError>> {
        Box::pin(async move { Ok(self.principals.get(subject).cloned()) })
    }
}
