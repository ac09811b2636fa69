//! Inbound protocol requests.
//!
//! The host layer parses the wire message and binds exactly one of these
//! variants to an invocation. Nothing in the pipeline mutates a request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::metadata::ClientMetadata;
use crate::context::scope::Scope;

#[derive(Debug, Clone)]
pub enum Request {
    Authentication(AuthenticationRequest),
    Token(TokenRequest),
    UserInfo(UserInfoRequest),
    Registration(RegistrationRequest),
    WebFinger(WebFingerRequest),
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Authentication(_) => "authentication",
            Request::Token(_) => "token",
            Request::UserInfo(_) => "userinfo",
            Request::Registration(_) => "registration",
            Request::WebFinger(_) => "webfinger",
        }
    }

    /// Client the request was issued by, when the protocol carries one.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            Request::Authentication(r) => Some(&r.client_id),
            Request::Token(r) => Some(&r.client_id),
            Request::UserInfo(r) => r.token.as_ref().map(|t| t.client_id.as_str()),
            Request::Registration(_) | Request::WebFinger(_) => None,
        }
    }
}

/// Authorization endpoint request (OIDC Core 3.1.2.1).
#[derive(Debug, Clone)]
pub struct AuthenticationRequest {
    pub client_id: String,
    pub response_type: String,
    pub redirect_uri: String,
    pub scope: Scope,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub prompt: Option<String>,
    pub response_mode: Option<String>,
    pub claims: Option<ClaimsRequest>,
}

/// Token endpoint request.
///
/// `grant` holds the claims bound to the authorization code being redeemed;
/// the host resolves it from the code store before the pipeline runs.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub client_id: String,
    pub grant_type: String,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub grant: Option<GrantClaims>,
}

/// UserInfo request. `token` is the resolved access token binding, if any.
#[derive(Debug, Clone)]
pub struct UserInfoRequest {
    pub access_token: String,
    pub token: Option<GrantClaims>,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub metadata: ClientMetadata,
}

#[derive(Debug, Clone)]
pub struct WebFingerRequest {
    pub resource: String,
    pub rel: Option<String>,
}

/// Claims bound to an authorization code or access token at issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantClaims {
    pub client_id: String,
    /// Subject as released to the client (public or pairwise).
    pub subject: String,
    /// Local principal name the subject was derived from.
    pub principal: String,
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_claims: Option<ClaimsRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    pub expires_at: i64,
}

impl GrantClaims {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// The OIDC `claims` request parameter (OIDC Core 5.5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimsRequest {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub userinfo: BTreeMap<String, Option<IndividualClaim>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub id_token: BTreeMap<String, Option<IndividualClaim>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl ClaimsRequest {
    /// The `sub` value the client asked the ID Token to carry, if any.
    pub fn requested_subject(&self) -> Option<&str> {
        self.id_token
            .get("sub")
            .and_then(Option::as_ref)
            .and_then(|claim| claim.value.as_ref())
            .and_then(Value::as_str)
    }

    pub fn userinfo_claim_names(&self) -> impl Iterator<Item = &str> {
        self.userinfo.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_request_extracts_requested_subject() {
        let claims: ClaimsRequest = serde_json::from_str(
            r#"{"id_token":{"sub":{"value":"248289761001"},"auth_time":{"essential":true}},
                "userinfo":{"email":null}}"#,
        )
        .unwrap();

        assert_eq!(claims.requested_subject(), Some("248289761001"));
        assert_eq!(claims.userinfo_claim_names().collect::<Vec<_>>(), vec!["email"]);
    }

    #[test]
    fn claims_request_without_sub_value() {
        let claims: ClaimsRequest =
            serde_json::from_str(r#"{"id_token":{"sub":null}}"#).unwrap();
        assert_eq!(claims.requested_subject(), None);
    }
}
