//! Response context: the mutable accumulator for outbound response data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::request::{ClaimsRequest, GrantClaims};
use crate::context::scope::{ResponseType, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectType {
    Public,
    Pairwise,
}

impl SubjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectType::Public => "public",
            SubjectType::Pairwise => "pairwise",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "public" => Some(Self::Public),
            "pairwise" => Some(Self::Pairwise),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ID Token claims (OIDC Core 2) while the token is still being assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compact JWS serialization of a signed ID Token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIdToken(String);

impl SignedIdToken {
    pub fn new(compact: String) -> Self {
        Self(compact)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
enum IdTokenState {
    Unsigned(IdTokenClaims),
    Signed(SignedIdToken),
}

/// An opaque token minted by the pipeline together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub value: String,
    pub expires_at: i64,
    pub claims: GrantClaims,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    pub subject: Option<String>,
    pub subject_type: Option<SubjectType>,
    pub acr: Option<String>,
    pub requested_claims: Option<ClaimsRequest>,
    /// Validated scope (requested ∩ registered).
    pub scope: Option<Scope>,
    /// Validated response type.
    pub response_type: Option<ResponseType>,
    /// Validated redirect URI; unset when validation did not match.
    pub redirect_uri: Option<String>,
    /// Expiration instant (unix seconds) of the artifacts being issued.
    pub expiration: Option<i64>,
    pub access_token: Option<IssuedToken>,
    pub authorization_code: Option<IssuedToken>,
    pub userinfo_claims: Option<Map<String, Value>>,
    pub signed_userinfo: Option<String>,
    id_token: Option<IdTokenState>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a fresh unsigned ID Token. Refused once a token has been signed.
    pub fn set_id_token(&mut self, claims: IdTokenClaims) -> bool {
        if matches!(self.id_token, Some(IdTokenState::Signed(_))) {
            return false;
        }
        self.id_token = Some(IdTokenState::Unsigned(claims));
        true
    }

    /// Unsigned claims, if an ID Token exists and has not been signed yet.
    pub fn id_token(&self) -> Option<&IdTokenClaims> {
        match &self.id_token {
            Some(IdTokenState::Unsigned(claims)) => Some(claims),
            _ => None,
        }
    }

    pub fn id_token_mut(&mut self) -> Option<&mut IdTokenClaims> {
        match &mut self.id_token {
            Some(IdTokenState::Unsigned(claims)) => Some(claims),
            _ => None,
        }
    }

    pub fn signed_id_token(&self) -> Option<&SignedIdToken> {
        match &self.id_token {
            Some(IdTokenState::Signed(token)) => Some(token),
            _ => None,
        }
    }

    pub fn has_id_token(&self) -> bool {
        self.id_token.is_some()
    }

    /// Removes the unsigned claims for signing. The slot stays empty until
    /// `set_signed_id_token` is called.
    pub fn take_unsigned_id_token(&mut self) -> Option<IdTokenClaims> {
        match self.id_token.take() {
            Some(IdTokenState::Unsigned(claims)) => Some(claims),
            other => {
                self.id_token = other;
                None
            }
        }
    }

    /// Stores the signed token. Refused if one is already signed.
    pub fn set_signed_id_token(&mut self, token: SignedIdToken) -> bool {
        if matches!(self.id_token, Some(IdTokenState::Signed(_))) {
            return false;
        }
        self.id_token = Some(IdTokenState::Signed(token));
        true
    }
}
