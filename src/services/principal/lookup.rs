use std::{future::Future, pin::Pin};

use super::Principal;
use crate::repos::error::RepoError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lookup result:
/// - `Ok(Some(_))`: subject resolved
/// - `Ok(None)`: unknown (or disabled) subject
/// - `Err(_)`: backend failure (caller treats the request as unauthenticated)
pub trait PrincipalLookup: Send + Sync {
    fn lookup_principal<'a>(
        &'a self,
        subject: &'a str,
    ) -> BoxFuture<'a, Result<Option<Principal>, LookupError>>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("principal store error: {0}")]
    Repo(#[from] RepoError),

    #[error("principal lookup failed: {0}")]
    Other(String),
}
