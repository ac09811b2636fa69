use std::str::FromStr;

use jsonwebtoken::{Algorithm, EncodingKey};
use tracing::warn;

use crate::services::signing::SigningError;

/// Key and algorithm material for signing responses.
///
/// The algorithm is kept as its JWS name so that a misconfigured or
/// unsupported value surfaces as a security-configuration failure at the step
/// that needs it, not when the invocation is assembled.
#[derive(Clone)]
pub struct SigningParameters {
    algorithm: String,
    key_id: Option<String>,
    key: EncodingKey,
}

impl std::fmt::Debug for SigningParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("SigningParameters")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .finish()
    }
}

impl SigningParameters {
    pub fn new(algorithm: impl Into<String>, key: EncodingKey, key_id: Option<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_id,
            key,
        }
    }

    /// Symmetric (HS*) parameters.
    pub fn hmac(algorithm: impl Into<String>, secret: &[u8], key_id: Option<String>) -> Self {
        Self::new(algorithm, EncodingKey::from_secret(secret), key_id)
    }

    /// Loads an asymmetric key in PEM form. The key family is chosen from the
    /// algorithm name (`RS*`/`PS*` → RSA, `ES*` → EC, `EdDSA` → Ed25519).
    pub fn from_pem(
        algorithm: &str,
        private_key_pem: &str,
        key_id: Option<String>,
    ) -> Result<Self, SigningError> {
        let pem = private_key_pem.as_bytes();
        let parsed = if algorithm.starts_with("RS") || algorithm.starts_with("PS") {
            EncodingKey::from_rsa_pem(pem)
        } else if algorithm.starts_with("ES") {
            EncodingKey::from_ec_pem(pem)
        } else if algorithm == "EdDSA" {
            EncodingKey::from_ed_pem(pem)
        } else {
            return Err(SigningError::UnsupportedAlgorithm(algorithm.to_string()));
        };
        let key = parsed.map_err(|e| {
            warn!(error = %e, algorithm, "failed to parse signing key PEM");
            SigningError::InvalidKey(e.to_string())
        })?;

        Ok(Self::new(algorithm, key, key_id))
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn key(&self) -> &EncodingKey {
        &self.key
    }

    /// The algorithm as understood by the JWS library.
    pub fn jws_algorithm(&self) -> Result<Algorithm, SigningError> {
        Algorithm::from_str(&self.algorithm)
            .map_err(|_| SigningError::UnsupportedAlgorithm(self.algorithm.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_key() {
        let params = SigningParameters::hmac("HS256", b"very-secret", Some("k1".into()));
        let printed = format!("{params:?}");
        assert!(printed.contains("HS256"));
        assert!(!printed.contains("very-secret"));
    }

    #[test]
    fn unknown_algorithm_is_rejected_lazily() {
        let params = SigningParameters::hmac("none", b"secret", None);
        assert!(matches!(
            params.jws_algorithm(),
            Err(SigningError::UnsupportedAlgorithm(alg)) if alg == "none"
        ));
    }

    #[test]
    fn pem_loading_rejects_symmetric_algorithms() {
        let err = SigningParameters::from_pem("HS256", "irrelevant", None).unwrap_err();
        assert!(matches!(err, SigningError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn pem_loading_reports_garbage_keys() {
        let err = SigningParameters::from_pem("RS256", "not a pem", None).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKey(_)));
    }
}
