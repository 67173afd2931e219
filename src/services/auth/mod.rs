pub mod factory;
pub mod token_codec;
pub mod verifier;

pub use factory::build_auth_services;
pub use token_codec::{Claims, CodecError, TokenCodec, TokenError};
pub use verifier::{TokenVerifier, VerificationError};
