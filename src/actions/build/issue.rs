//! Minting of authorization codes and access tokens.

use tracing::{debug, error};

use crate::context::request::{GrantClaims, Request};
use crate::context::response::IssuedToken;
use crate::context::{Invocation, MetadataBearing, RequestBearing, ResponseBearing, ResponseType};
use crate::pipeline::strategy::{self, Lookup, lookup};
use crate::pipeline::{Abort, Action, Event, Gate};
use crate::services::signing::hash::generate_token;

fn mint() -> Result<String, Abort> {
    generate_token().map_err(|e| {
        error!(error = %e, "failed to generate token");
        Abort::new(Event::InvalidSecurityConfiguration, e.to_string())
    })
}

fn expiry(lifetime: i64) -> Result<i64, Abort> {
    strategy::now().checked_add(lifetime).ok_or_else(|| {
        error!(lifetime, "token lifetime overflows the expiration instant");
        Abort::new(Event::InvalidSecurityConfiguration, "token lifetime out of range")
    })
}

fn response_type_includes(inv: &Invocation, part: &str) -> bool {
    inv.response()
        .ok()
        .and_then(|r| r.response_type.as_ref())
        .is_some_and(|rt| rt.includes(part))
}

/// Claims captured at the authorization endpoint for later redemption.
fn authorization_claims(inv: &Invocation, expires_at: i64) -> Result<GrantClaims, Abort> {
    let response = inv.response()?;
    let authentication = inv
        .authentication
        .as_ref()
        .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no authentication result"))?;
    let subject = response
        .subject
        .clone()
        .ok_or_else(|| Abort::new(Event::InvalidSubject, "no subject resolved"))?;

    Ok(GrantClaims {
        client_id: inv.relying_party()?.client_id.clone(),
        subject,
        principal: authentication.principal.clone(),
        scope: response.scope.clone().unwrap_or_default(),
        acr: response.acr.clone(),
        nonce: strategy::nonce(inv),
        auth_time: strategy::auth_time(inv),
        requested_claims: response.requested_claims.clone(),
        redirect_uri: response.redirect_uri.clone(),
        expires_at,
    })
}

/// Issues an authorization code when the response type includes `code`.
/// The code is bound to the validated redirect URI; without one it is not
/// issued.
#[derive(Debug, Default)]
pub struct IssueAuthorizationCode;

impl Action for IssueAuthorizationCode {
    fn name(&self) -> &'static str {
        "issue_authorization_code"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        inv.relying_party()?;
        if !response_type_includes(inv, ResponseType::CODE) {
            return Ok(Gate::Skip);
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        if inv.response()?.redirect_uri.is_none() {
            return Err(Abort::new(
                Event::InvalidRedirectUri,
                "no validated redirect_uri to bind the code to",
            ));
        }

        let expires_at = expiry(inv.profile.authorization_code_lifetime_seconds)?;
        let claims = authorization_claims(inv, expires_at)?;
        let value = mint()?;

        debug!(subject = %claims.subject, expires_at, "authorization code issued");
        inv.response_mut()?.authorization_code = Some(IssuedToken {
            value,
            expires_at,
            claims,
        });
        Ok(())
    }
}

/// Issues a bearer access token: always at the token endpoint, and at the
/// authorization endpoint when the response type includes `token`.
pub struct IssueAccessToken {
    lifetime: Lookup<i64>,
}

impl Default for IssueAccessToken {
    fn default() -> Self {
        Self {
            lifetime: lookup(strategy::access_token_lifetime),
        }
    }
}

impl IssueAccessToken {
    pub fn with_lookup(lifetime: Lookup<i64>) -> Self {
        Self { lifetime }
    }
}

impl Action for IssueAccessToken {
    fn name(&self) -> &'static str {
        "issue_access_token"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        inv.relying_party()?;
        match inv.request()? {
            Request::Token(_) => Ok(Gate::Run),
            Request::Authentication(_) if response_type_includes(inv, ResponseType::TOKEN) => {
                Ok(Gate::Run)
            }
            _ => Ok(Gate::Skip),
        }
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let lifetime = (self.lifetime)(inv)
            .filter(|l| *l > 0)
            .unwrap_or(inv.profile.access_token_lifetime_seconds);
        let expires_at = expiry(lifetime)?;

        let claims = match strategy::grant_claims(inv) {
            Some(grant) => GrantClaims {
                scope: inv.response()?.scope.clone().unwrap_or_else(|| grant.scope.clone()),
                expires_at,
                ..grant.clone()
            },
            None => authorization_claims(inv, expires_at)?,
        };
        let value = mint()?;

        debug!(subject = %claims.subject, expires_at, "access token issued");
        inv.response_mut()?.access_token = Some(IssuedToken {
            value,
            expires_at,
            claims,
        });
        Ok(())
    }
}
