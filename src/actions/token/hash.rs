//! `at_hash` and `c_hash` (OIDC Core 3.3.2.11).
//!
//! Both claims are computed only when signing parameters exist, the response
//! carries an unsigned ID Token and the flow returns the source token next to
//! it. Once those hold, a missing source token is a message-context failure
//! and an algorithm without a defined digest is a security-configuration
//! failure.

use tracing::{debug, warn};

use crate::context::request::Request;
use crate::context::response::{IssuedToken, ResponseContext};
use crate::context::{Invocation, MetadataBearing, RequestBearing, ResponseBearing, ResponseType};
use crate::pipeline::{Abort, Action, Event, Gate};
use crate::services::signing::hash::token_hash;

fn gate(
    inv: &Invocation,
    claim: &str,
    applies: bool,
    source: fn(&ResponseContext) -> Option<&IssuedToken>,
) -> Result<Gate, Abort> {
    if inv.signing.is_none() {
        debug!(claim, "no signing parameters, hash claim not computed");
        return Ok(Gate::Skip);
    }
    inv.relying_party()?;
    let response = inv.response()?;
    if response.id_token().is_none() || !applies {
        return Ok(Gate::Skip);
    }
    if source(response).is_none() {
        return Err(Abort::new(
            Event::InvalidMessageContext,
            format!("no token to compute {claim} over"),
        ));
    }
    Ok(Gate::Run)
}

fn compute(
    inv: &Invocation,
    claim: &str,
    source: fn(&ResponseContext) -> Option<&IssuedToken>,
) -> Result<String, Abort> {
    let algorithm = inv
        .signing
        .as_ref()
        .map(|s| s.algorithm())
        .ok_or_else(|| Abort::new(Event::InvalidSecurityConfiguration, "no signing parameters"))?;
    let token = source(inv.response()?).ok_or_else(|| {
        Abort::new(
            Event::InvalidMessageContext,
            format!("no token to compute {claim} over"),
        )
    })?;

    token_hash(algorithm, &token.value).map_err(|e| {
        warn!(claim, algorithm, error = %e, "cannot compute hash claim");
        Abort::new(Event::InvalidSecurityConfiguration, e.to_string())
    })
}

fn unsigned_token_gone() -> Abort {
    Abort::new(Event::InvalidProfileContext, "ID Token is no longer mutable")
}

fn response_type_includes(inv: &Invocation, part: &str) -> bool {
    inv.response()
        .ok()
        .and_then(|r| r.response_type.as_ref())
        .is_some_and(|rt| rt.includes(part))
}

#[derive(Debug, Default)]
pub struct SetAccessTokenHash;

impl SetAccessTokenHash {
    fn source(response: &ResponseContext) -> Option<&IssuedToken> {
        response.access_token.as_ref()
    }
}

impl Action for SetAccessTokenHash {
    fn name(&self) -> &'static str {
        "set_access_token_hash"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        // the token endpoint always returns the access token with the ID Token
        let applies = match inv.request()? {
            Request::Authentication(_) => response_type_includes(inv, ResponseType::TOKEN),
            Request::Token(_) => true,
            _ => false,
        };
        gate(inv, "at_hash", applies, Self::source)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let hash = compute(inv, "at_hash", Self::source)?;
        debug!(at_hash = %hash, "at_hash set");
        inv.response_mut()?
            .id_token_mut()
            .ok_or_else(unsigned_token_gone)?
            .at_hash = Some(hash);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SetCodeHash;

impl SetCodeHash {
    fn source(response: &ResponseContext) -> Option<&IssuedToken> {
        response.authorization_code.as_ref()
    }
}

impl Action for SetCodeHash {
    fn name(&self) -> &'static str {
        "set_code_hash"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        let applies = matches!(inv.request()?, Request::Authentication(_))
            && response_type_includes(inv, ResponseType::CODE);
        gate(inv, "c_hash", applies, Self::source)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let hash = compute(inv, "c_hash", Self::source)?;
        debug!(c_hash = %hash, "c_hash set");
        inv.response_mut()?
            .id_token_mut()
            .ok_or_else(unsigned_token_gone)?
            .c_hash = Some(hash);
        Ok(())
    }
}
