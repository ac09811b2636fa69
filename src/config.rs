/*
 * Responsibility
 * - Read provider settings from the environment (.env via dotenvy)
 * - Assemble the ProfileConfiguration and SigningParameters shared by every invocation
 * - HTTP limits (timeout / body size) applied by middleware::http
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use std::env;

use thiserror::Error;
use tracing::warn;

use crate::context::{ProfileConfiguration, SigningParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Transport limits enforced in front of every route.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub issuer: String,
    pub signing_algorithm: String,
    // PEM for RS*/PS*/ES*/EdDSA, shared secret for HS*
    pub signing_key: Option<String>,
    pub signing_key_id: Option<String>,
    // Lifetimes (seconds)
    pub id_token_lifetime_seconds: i64,
    pub access_token_lifetime_seconds: i64,
    pub authorization_code_lifetime_seconds: i64,
    pub supported_response_types: Vec<String>,
    pub token_endpoint_auth_methods: Vec<String>,
    pub supported_signing_algorithms: Vec<String>,
    pub pairwise_salt: String,
    pub user_directory: Option<PathBuf>,
    pub http: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match get("OIDC_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("OIDC_PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("OIDC_PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let issuer = get("OIDC_ISSUER").ok_or(ConfigError::Missing("OIDC_ISSUER"))?;
        if url::Url::parse(&issuer).is_err() {
            return Err(ConfigError::Invalid("OIDC_ISSUER"));
        }
        let pairwise_salt =
            get("OIDC_PAIRWISE_SALT").ok_or(ConfigError::Missing("OIDC_PAIRWISE_SALT"))?;

        let signing_algorithm = get("OIDC_SIGNING_ALG").unwrap_or_else(|| "RS256".to_string());
        let signing_key = get("OIDC_SIGNING_KEY").map(|k| k.replace("\\n", "\n"));
        let signing_key_id = get("OIDC_SIGNING_KEY_ID");

        let id_token_lifetime_seconds =
            seconds(&get, "OIDC_ID_TOKEN_LIFETIME_SECONDS", 3600)?; // 1 hour
        let access_token_lifetime_seconds =
            seconds(&get, "OIDC_ACCESS_TOKEN_LIFETIME_SECONDS", 600)?; // 10 min
        let authorization_code_lifetime_seconds =
            seconds(&get, "OIDC_AUTHORIZATION_CODE_LIFETIME_SECONDS", 300)?; // 5 min

        let supported_response_types = get("OIDC_RESPONSE_TYPES")
            .map(|raw| parse_list(&raw, ','))
            .unwrap_or_else(|| {
                [
                    "code",
                    "id_token",
                    "id_token token",
                    "code id_token",
                    "code token",
                    "code id_token token",
                ]
                .map(String::from)
                .to_vec()
            });
        let token_endpoint_auth_methods = get("OIDC_TOKEN_ENDPOINT_AUTH_METHODS")
            .map(|raw| parse_list(&raw, ','))
            .unwrap_or_else(|| {
                ["client_secret_basic", "client_secret_post"]
                    .map(String::from)
                    .to_vec()
            });
        let supported_signing_algorithms = get("OIDC_SIGNING_ALGS")
            .map(|raw| parse_list(&raw, ','))
            .unwrap_or_else(|| vec![signing_algorithm.clone()]);

        let user_directory = get("OIDC_USER_DIRECTORY").map(PathBuf::from);

        let timeout_seconds: u64 = match get("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_TIMEOUT_SECONDS"))?,
            None => 30,
        };
        let body_limit_bytes: usize = match get("HTTP_BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("HTTP_BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Config {
            addr,
            app_env,
            issuer,
            signing_algorithm,
            signing_key,
            signing_key_id,
            id_token_lifetime_seconds,
            access_token_lifetime_seconds,
            authorization_code_lifetime_seconds,
            supported_response_types,
            token_endpoint_auth_methods,
            supported_signing_algorithms,
            pairwise_salt,
            user_directory,
            http: HttpLimits {
                timeout: Duration::from_secs(timeout_seconds),
                body_limit_bytes,
            },
        })
    }

    pub fn profile(&self) -> ProfileConfiguration {
        ProfileConfiguration {
            issuer: self.issuer.clone(),
            id_token_lifetime_seconds: self.id_token_lifetime_seconds,
            access_token_lifetime_seconds: self.access_token_lifetime_seconds,
            authorization_code_lifetime_seconds: self.authorization_code_lifetime_seconds,
            supported_response_types: self.supported_response_types.clone(),
            token_endpoint_auth_methods: self.token_endpoint_auth_methods.clone(),
            supported_signing_algorithms: self.supported_signing_algorithms.clone(),
            pairwise_salt: self.pairwise_salt.clone(),
        }
    }

    /// Signing parameters for ID Tokens and signed UserInfo responses.
    ///
    /// `Ok(None)` when no key is configured; flows that must sign then fail
    /// with a server error at the signing step.
    pub fn signing(&self) -> Result<Option<SigningParameters>, ConfigError> {
        let Some(key) = &self.signing_key else {
            warn!(
                algorithm = %self.signing_algorithm,
                "no signing key configured, ID Tokens cannot be issued"
            );
            return Ok(None);
        };

        if self.signing_algorithm.starts_with("HS") {
            return Ok(Some(SigningParameters::hmac(
                self.signing_algorithm.clone(),
                key.as_bytes(),
                self.signing_key_id.clone(),
            )));
        }

        SigningParameters::from_pem(&self.signing_algorithm, key, self.signing_key_id.clone())
            .map(Some)
            .map_err(|_| ConfigError::Invalid("OIDC_SIGNING_KEY"))
    }
}

/// Upper bound for any configured lifetime (one year).
pub const MAX_LIFETIME_SECONDS: i64 = 365 * 24 * 60 * 60;

fn seconds(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: i64,
) -> Result<i64, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v > 0 && v <= MAX_LIFETIME_SECONDS => Ok(v),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

/// Splits a delimited list, trimming entries and dropping empty ones.
pub fn parse_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("OIDC_ISSUER", "https://op.example"),
        ("OIDC_PAIRWISE_SALT", "salt"),
    ];

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.signing_algorithm, "RS256");
        assert_eq!(config.supported_signing_algorithms, vec!["RS256"]);
        assert_eq!(config.id_token_lifetime_seconds, 3600);
        assert_eq!(config.access_token_lifetime_seconds, 600);
        assert_eq!(config.authorization_code_lifetime_seconds, 300);
        assert!(config.supported_response_types.contains(&"code".to_string()));
        assert_eq!(config.http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn issuer_and_salt_are_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[("OIDC_PAIRWISE_SALT", "salt")])).unwrap_err(),
            ConfigError::Missing("OIDC_ISSUER")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("OIDC_ISSUER", "https://op.example")])).unwrap_err(),
            ConfigError::Missing("OIDC_PAIRWISE_SALT")
        );
    }

    #[test]
    fn rejects_non_positive_lifetimes() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OIDC_ID_TOKEN_LIFETIME_SECONDS", "0"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("OIDC_ID_TOKEN_LIFETIME_SECONDS")
        );
    }

    #[test]
    fn rejects_lifetimes_beyond_the_cap() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OIDC_ID_TOKEN_LIFETIME_SECONDS", "9223372036854775807"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("OIDC_ID_TOKEN_LIFETIME_SECONDS")
        );

        let cap = MAX_LIFETIME_SECONDS.to_string();
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OIDC_ACCESS_TOKEN_LIFETIME_SECONDS", cap.as_str()));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.access_token_lifetime_seconds, MAX_LIFETIME_SECONDS);
    }

    #[test]
    fn config_errors_name_the_key() {
        assert_eq!(
            ConfigError::Missing("OIDC_ISSUER").to_string(),
            "missing configuration: OIDC_ISSUER"
        );
    }

    #[test]
    fn parse_list_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_list(" code , id_token token,,", ','),
            vec!["code", "id_token token"]
        );
    }

    #[test]
    fn hmac_signing_from_shared_secret() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("OIDC_SIGNING_ALG", "HS256"),
            ("OIDC_SIGNING_KEY", "0123456789abcdef0123456789abcdef"),
            ("OIDC_SIGNING_KEY_ID", "k1"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        let signing = config.signing().unwrap().unwrap();

        assert_eq!(signing.algorithm(), "HS256");
        assert_eq!(signing.key_id(), Some("k1"));
    }

    #[test]
    fn missing_key_yields_no_signing_parameters() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert!(config.signing().unwrap().is_none());
    }

    #[test]
    fn garbage_pem_is_invalid() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("OIDC_SIGNING_KEY", "not a pem"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(
            config.signing().unwrap_err(),
            ConfigError::Invalid("OIDC_SIGNING_KEY")
        );
    }
}
