//! Stateless bearer-token authentication for axum services.
//!
//! - [`services::auth`]: HS256 token codec and verifier
//! - [`middleware::auth`]: bearer extraction, the per-request authentication
//!   middleware, and the 401 responder
//! - [`api::v1::extractors`]: how handlers read the resolved identity

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
