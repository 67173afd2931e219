//! Identity resolution for verified token subjects.
//!
//! The middleware only knows the subject carried by the token; turning it
//! into a [`Principal`] (username + authorities) is delegated to a
//! [`PrincipalLookup`] implementation.

mod lookup;
mod memory;
mod types;

pub use lookup::{BoxFuture, LookupError, PrincipalLookup};
pub use memory::InMemoryPrincipals;
pub use types::Principal;
