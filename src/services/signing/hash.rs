//! Digest helpers: `at_hash`/`c_hash` values, pairwise subjects and opaque
//! token generation.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::services::signing::SigningError;

/// Hash claim for `token` under the JWS algorithm `algorithm` (OIDC Core
/// 3.1.3.6): the left-most half of the digest, base64url without padding.
pub fn token_hash(algorithm: &str, token: &str) -> Result<String, SigningError> {
    let digest = if algorithm == "EdDSA" || algorithm.ends_with("512") {
        Sha512::digest(token.as_bytes()).to_vec()
    } else if algorithm.ends_with("384") {
        Sha384::digest(token.as_bytes()).to_vec()
    } else if algorithm.ends_with("256") {
        Sha256::digest(token.as_bytes()).to_vec()
    } else {
        return Err(SigningError::UnsupportedAlgorithm(algorithm.to_string()));
    };

    Ok(URL_SAFE_NO_PAD.encode(&digest[..digest.len() / 2]))
}

/// Pairwise subject identifier (OIDC Core 8.1): a salted SHA-256 over the
/// sector identifier and the local principal.
pub fn pairwise_subject(sector: &str, principal: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sector.as_bytes());
    hasher.update(b"\x00");
    hasher.update(principal.as_bytes());
    hasher.update(b"\x00");
    hasher.update(salt.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// 32 bytes of entropy, URL-safe base64 without padding.
pub fn generate_token() -> Result<String, SigningError> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|e| SigningError::Random(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
