//! Outbound messages produced by the final step of each flow.
//!
//! The host serializes these; the pipeline never writes bytes.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use url::Url;

use crate::context::metadata::ClientMetadata;

#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Authentication(AuthenticationResponse),
    Token(TokenResponse),
    UserInfo(UserInfoResponse),
    Registration(RegistrationResponse),
    WebFinger(WebFingerResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Query,
    Fragment,
}

impl ResponseMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "query" => Some(Self::Query),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }
}

/// Authorization response delivered by redirecting the user agent.
#[derive(Debug, Clone)]
pub struct AuthenticationResponse {
    pub redirect_uri: String,
    pub response_mode: ResponseMode,
    pub params: Vec<(String, String)>,
}

impl AuthenticationResponse {
    /// The `Location` the user agent is sent to.
    pub fn location(&self) -> Result<String, url::ParseError> {
        let mut url = Url::parse(&self.redirect_uri)?;
        match self.response_mode {
            ResponseMode::Query => {
                let mut pairs = url.query_pairs_mut();
                for (k, v) in &self.params {
                    pairs.append_pair(k, v);
                }
            }
            ResponseMode::Fragment => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(self.params.iter())
                    .finish();
                url.set_fragment(Some(&encoded));
            }
        }
        Ok(url.to_string())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Successful token endpoint response (RFC 6749 5.1, OIDC Core 3.1.3.3).
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserInfoResponse {
    Claims(Map<String, Value>),
    /// Signed JWT, served as `application/jwt`.
    Signed(String),
}

/// Client registration response (RFC 7591 3.2.1).
#[derive(Debug, Clone)]
pub struct RegistrationResponse {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub client_id_issued_at: i64,
    pub metadata: ClientMetadata,
}

impl Serialize for RegistrationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = self.metadata.to_json_map();
        map.insert("client_id".into(), Value::String(self.client_id.clone()));
        map.insert(
            "client_id_issued_at".into(),
            Value::from(self.client_id_issued_at),
        );
        if let Some(secret) = &self.client_secret {
            map.insert("client_secret".into(), Value::String(secret.clone()));
            // 0: the secret does not expire
            map.insert("client_secret_expires_at".into(), Value::from(0));
        }
        map.serialize(serializer)
    }
}

/// WebFinger JRD (RFC 7033) for OpenID issuer discovery.
#[derive(Debug, Clone, Serialize)]
pub struct WebFingerResponse {
    pub subject: String,
    pub links: Vec<WebFingerLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebFingerLink {
    pub rel: String,
    pub href: String,
}
