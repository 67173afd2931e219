/// Factory: build the token codec/verifier pair from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{CodecError, TokenCodec, TokenVerifier};

pub fn build_auth_services(config: &Config) -> Result<(Arc<TokenCodec>, TokenVerifier), CodecError> {
    let codec = Arc::new(TokenCodec::new(&config.jwt_secret, config.jwt_expiration)?);
    let verifier = TokenVerifier::new(codec.clone());

    tracing::debug!(ttl = ?codec.ttl(), "token codec ready");

    Ok((codec, verifier))
}
