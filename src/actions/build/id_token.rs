use serde_json::Map;
use tracing::debug;

use crate::context::request::Request;
use crate::context::response::IdTokenClaims;
use crate::context::scope::OPENID;
use crate::context::{Invocation, MetadataBearing, RequestBearing, ResponseBearing, ResponseType};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Claim names the shell sets itself; user attributes never override them.
const RESERVED: &[&str] = &[
    "iss", "sub", "aud", "exp", "iat", "auth_time", "nonce", "acr", "at_hash", "c_hash",
];

/// Creates the unsigned ID Token (OIDC Core 2) for flows that return one.
///
/// Claims requested for the ID Token through the `claims` parameter are
/// released from the user's attributes when available.
#[derive(Debug, Default)]
pub struct AddIdTokenShell;

/// Whether this invocation's response carries an ID Token.
pub fn issues_id_token(inv: &Invocation) -> bool {
    let Ok(response) = inv.response() else {
        return false;
    };
    match inv.request() {
        Ok(Request::Authentication(_)) => response
            .response_type
            .as_ref()
            .is_some_and(|rt| rt.includes(ResponseType::ID_TOKEN)),
        Ok(Request::Token(_)) => response.scope.as_ref().is_some_and(|s| s.contains(OPENID)),
        _ => false,
    }
}

impl Action for AddIdTokenShell {
    fn name(&self) -> &'static str {
        "add_id_token_shell"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        inv.relying_party()?;
        if !issues_id_token(inv) {
            return Ok(Gate::Skip);
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let now = strategy::now();
        let response = inv.response()?;
        let sub = response
            .subject
            .clone()
            .ok_or_else(|| Abort::new(Event::InvalidSubject, "no subject for ID Token"))?;
        let exp = response
            .expiration
            .unwrap_or(now + inv.profile.id_token_lifetime_seconds);

        let mut extra = Map::new();
        if let (Some(requested), Some(attributes)) =
            (response.requested_claims.as_ref(), inv.user_attributes.as_ref())
        {
            for name in requested.id_token.keys() {
                if RESERVED.contains(&name.as_str()) {
                    continue;
                }
                if let Some(value) = attributes.get(name) {
                    extra.insert(name.clone(), value.clone());
                }
            }
        }

        let claims = IdTokenClaims {
            iss: inv.profile.issuer.clone(),
            sub,
            aud: inv.relying_party()?.client_id.clone(),
            exp,
            iat: now,
            auth_time: strategy::auth_time(inv),
            nonce: strategy::nonce(inv),
            acr: None,
            at_hash: None,
            c_hash: None,
            extra,
        };

        debug!(sub = %claims.sub, exp = claims.exp, "ID Token shell created");
        if !inv.response_mut()?.set_id_token(claims) {
            return Err(Abort::new(
                Event::InvalidProfileContext,
                "ID Token already signed",
            ));
        }
        Ok(())
    }
}
