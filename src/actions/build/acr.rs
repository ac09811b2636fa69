//! Authentication Context Class Reference handling.

use tracing::debug;

use crate::context::{Invocation, ResponseBearing};
use crate::pipeline::strategy;
use crate::pipeline::{Abort, Action, Event, Gate};

/// Records the acr of the completed authentication on the response context.
#[derive(Debug, Default)]
pub struct ResolveAcr;

impl Action for ResolveAcr {
    fn name(&self) -> &'static str {
        "resolve_acr"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        if inv.authentication.is_none() {
            return Err(Abort::new(Event::InvalidProfileContext, "no authentication result"));
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let acr = inv.authentication.as_ref().and_then(|a| a.acr.clone());
        inv.response_mut()?.acr = acr;
        Ok(())
    }
}

/// Copies the resolved acr into the ID Token. Absent acr is not an error.
#[derive(Debug, Default)]
pub struct AddAcrToIdToken;

impl Action for AddAcrToIdToken {
    fn name(&self) -> &'static str {
        "add_acr_to_id_token"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        if inv.response()?.id_token().is_none() {
            return Ok(Gate::Skip);
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let response = inv.response_mut()?;
        let Some(acr) = response.acr.clone() else {
            debug!("no acr resolved, nothing to add");
            return Ok(());
        };
        if let Some(id_token) = response.id_token_mut() {
            id_token.acr = Some(acr);
        }
        Ok(())
    }
}

/// Token endpoint: the acr comes from the claims bound to the redeemed code.
#[derive(Debug, Default)]
pub struct AddAcrFromAuthorizationCode;

impl Action for AddAcrFromAuthorizationCode {
    fn name(&self) -> &'static str {
        "add_acr_from_authorization_code"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        let response = inv.response()?;
        if strategy::grant_claims(inv).is_none() {
            return Err(Abort::new(
                Event::InvalidMessageContext,
                "no claims bound to authorization code",
            ));
        }
        if response.id_token().is_none() {
            return Ok(Gate::Skip);
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let acr = strategy::grant_claims(inv).and_then(|g| g.acr.clone());
        let response = inv.response_mut()?;
        response.acr = acr.clone();
        if let Some(id_token) = response.id_token_mut() {
            id_token.acr = acr;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::request::Request;
    use crate::context::response::IdTokenClaims;
    use crate::test_support::{
        authenticated, authentication_request, grant, prepared, token_request,
    };

    fn shell() -> IdTokenClaims {
        IdTokenClaims {
            iss: "https://op.example".into(),
            sub: "alice".into(),
            aud: "client-1".into(),
            exp: 2,
            iat: 1,
            auth_time: None,
            nonce: None,
            acr: None,
            at_hash: None,
            c_hash: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn resolves_acr_from_authentication() {
        let mut inv = prepared(Request::Authentication(authentication_request()))
            .with_authentication(authenticated("alice"));
        ResolveAcr.execute(&mut inv).unwrap();
        assert_eq!(
            inv.response.unwrap().acr.as_deref(),
            Some("urn:mace:incommon:iap:silver")
        );
    }

    #[test]
    fn copies_acr_only_when_present() {
        let mut inv = prepared(Request::Authentication(authentication_request()));
        inv.response.as_mut().unwrap().set_id_token(shell());

        AddAcrToIdToken.execute(&mut inv).unwrap();
        assert!(inv.response.as_ref().unwrap().id_token().unwrap().acr.is_none());

        inv.response.as_mut().unwrap().acr = Some("urn:acr:mfa".into());
        AddAcrToIdToken.execute(&mut inv).unwrap();
        assert_eq!(
            inv.response.unwrap().id_token().unwrap().acr.as_deref(),
            Some("urn:acr:mfa")
        );
    }

    #[test]
    fn skipped_without_id_token() {
        let inv = prepared(Request::Authentication(authentication_request()));
        assert_eq!(AddAcrToIdToken.pre_execute(&inv).unwrap(), Gate::Skip);
    }

    #[test]
    fn acr_from_code_requires_grant_claims() {
        let inv = prepared(Request::Token(token_request(None)));
        let err = AddAcrFromAuthorizationCode.pre_execute(&inv).unwrap_err();
        assert_eq!(err.event, Event::InvalidMessageContext);
    }

    #[test]
    fn acr_from_code_is_copied() {
        let mut inv = prepared(Request::Token(token_request(Some(grant()))));
        inv.response.as_mut().unwrap().set_id_token(shell());

        assert_eq!(AddAcrFromAuthorizationCode.pre_execute(&inv).unwrap(), Gate::Run);
        AddAcrFromAuthorizationCode.execute(&mut inv).unwrap();
        assert_eq!(
            inv.response.unwrap().id_token().unwrap().acr.as_deref(),
            Some("urn:acr:password")
        );
    }
}
