//! JWS signing and the digest-derived claims that bind tokens to an ID Token.

pub mod hash;

use jsonwebtoken::Header;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::context::SigningParameters;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    #[error("random source failure: {0}")]
    Random(String),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Signs `claims` as a compact JWS with `typ: JWT` and the configured `kid`.
pub fn sign_claims<T: Serialize>(
    params: &SigningParameters,
    claims: &T,
) -> Result<String, SigningError> {
    let mut header = Header::new(params.jws_algorithm()?);
    header.typ = Some("JWT".to_string());
    header.kid = params.key_id().map(str::to_string);

    jsonwebtoken::encode(&header, claims, params.key()).map_err(|e| {
        error!(error = %e, algorithm = params.algorithm(), "failed to sign JWT");
        SigningError::Jwt(e)
    })
}
