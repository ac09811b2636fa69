/*
 * Responsibility
 * - Authorization request query parameters (OIDC Core 3.1.2.1)
 * - Shape checks before the request is bound to an invocation
 */
use serde::Deserialize;

use crate::context::Scope;
use crate::context::request::{AuthenticationRequest, ClaimsRequest};

#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeParams {
    pub client_id: Option<String>,
    pub response_type: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub prompt: Option<String>,
    pub response_mode: Option<String>,
    // JSON-encoded `claims` parameter (OIDC Core 5.5)
    pub claims: Option<String>,
}

impl AuthorizeParams {
    pub fn into_request(self) -> Result<AuthenticationRequest, &'static str> {
        let client_id = self
            .client_id
            .filter(|v| !v.is_empty())
            .ok_or("client_id is required")?;
        let redirect_uri = self
            .redirect_uri
            .filter(|v| !v.is_empty())
            .ok_or("redirect_uri is required")?;
        let claims = match self.claims.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                serde_json::from_str::<ClaimsRequest>(raw)
                    .map_err(|_| "claims must be a JSON object")?,
            ),
        };

        Ok(AuthenticationRequest {
            client_id,
            response_type: self.response_type.unwrap_or_default(),
            redirect_uri,
            scope: Scope::parse(self.scope.as_deref().unwrap_or_default()),
            state: self.state,
            nonce: self.nonce,
            prompt: self.prompt,
            response_mode: self.response_mode,
            claims,
        })
    }
}
