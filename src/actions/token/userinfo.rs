//! UserInfo claim release, optional signing and response formation.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::context::outbound::{OutboundMessage, UserInfoResponse};
use crate::context::{Invocation, MetadataBearing, ResponseBearing, Scope};
use crate::pipeline::{Abort, Action, Event, Gate};
use crate::services::signing::sign_claims;

/// Standard claims released per scope value (OIDC Core 5.4).
const SCOPE_CLAIMS: &[(&str, &[&str])] = &[
    (
        "profile",
        &[
            "name",
            "family_name",
            "given_name",
            "middle_name",
            "nickname",
            "preferred_username",
            "profile",
            "picture",
            "website",
            "gender",
            "birthdate",
            "zoneinfo",
            "locale",
            "updated_at",
        ],
    ),
    ("email", &["email", "email_verified"]),
    ("address", &["address"]),
    ("phone", &["phone_number", "phone_number_verified"]),
];

pub fn released_claims(scope: &Scope) -> BTreeSet<&'static str> {
    SCOPE_CLAIMS
        .iter()
        .filter(|(value, _)| scope.contains(value))
        .flat_map(|(_, claims)| claims.iter().copied())
        .collect()
}

fn userinfo_alg(inv: &Invocation) -> Option<&str> {
    inv.client_metadata()
        .ok()
        .and_then(|m| m.userinfo_signed_response_alg.as_deref())
}

/// Filters the user's attributes down to what the validated scope and the
/// `claims` request parameter release. `sub` is always present.
#[derive(Debug, Default)]
pub struct ResolveUserInfoClaims;

impl Action for ResolveUserInfoClaims {
    fn name(&self) -> &'static str {
        "resolve_userinfo_claims"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let response = inv.response()?;
        let sub = response
            .subject
            .clone()
            .ok_or_else(|| Abort::new(Event::InvalidSubject, "no subject for UserInfo"))?;

        let scope = response.scope.clone().unwrap_or_default();
        let mut names: BTreeSet<&str> = released_claims(&scope);
        if let Some(requested) = response.requested_claims.as_ref() {
            names.extend(requested.userinfo_claim_names());
        }

        let mut claims = Map::new();
        claims.insert("sub".into(), Value::String(sub));
        if let Some(attributes) = inv.user_attributes.as_ref() {
            for name in names.into_iter().filter(|n| *n != "sub") {
                if let Some(value) = attributes.get(name) {
                    claims.insert(name.to_string(), value.clone());
                }
            }
        }

        debug!(released = claims.len(), "userinfo claims resolved");
        inv.response_mut()?.userinfo_claims = Some(claims);
        Ok(())
    }
}

/// Signs the UserInfo claims when the client registered
/// `userinfo_signed_response_alg`.
#[derive(Debug, Default)]
pub struct SignUserInfoClaims;

impl Action for SignUserInfoClaims {
    fn name(&self) -> &'static str {
        "sign_userinfo_claims"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        let response = inv.response()?;
        inv.relying_party()?;
        let Some(alg) = userinfo_alg(inv) else {
            return Ok(Gate::Skip);
        };
        match inv.signing.as_ref() {
            Some(params) if params.algorithm() == alg => {}
            _ => {
                return Err(Abort::new(
                    Event::InvalidSecurityConfiguration,
                    format!("no signing parameters for UserInfo alg {alg}"),
                ));
            }
        }
        if response.userinfo_claims.is_none() {
            return Err(Abort::new(
                Event::InvalidProfileContext,
                "no UserInfo claims to sign",
            ));
        }
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let mut claims = inv
            .response()?
            .userinfo_claims
            .clone()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no UserInfo claims to sign"))?;
        claims.insert("iss".into(), Value::String(inv.profile.issuer.clone()));
        claims.insert(
            "aud".into(),
            Value::String(inv.relying_party()?.client_id.clone()),
        );

        let params = inv.signing.as_ref().ok_or_else(|| {
            Abort::new(Event::InvalidSecurityConfiguration, "no signing parameters")
        })?;
        let signed = sign_claims(params, &claims)
            .map_err(|e| Abort::new(Event::InvalidSecurityConfiguration, e.to_string()))?;

        debug!("userinfo claims signed");
        inv.response_mut()?.signed_userinfo = Some(signed);
        Ok(())
    }
}

/// Writes the UserInfo response: the signed JWT when the client asked for
/// one, the plain claims otherwise.
#[derive(Debug, Default)]
pub struct FormUserInfoResponse;

impl Action for FormUserInfoResponse {
    fn name(&self) -> &'static str {
        "form_userinfo_response"
    }

    fn pre_execute(&self, inv: &Invocation) -> Result<Gate, Abort> {
        inv.response()?;
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort> {
        let response = inv.response()?;
        let message = if userinfo_alg(inv).is_some() {
            let signed = response.signed_userinfo.clone().ok_or_else(|| {
                Abort::new(Event::InvalidSecurityConfiguration, "UserInfo was not signed")
            })?;
            UserInfoResponse::Signed(signed)
        } else {
            let claims = response.userinfo_claims.clone().ok_or_else(|| {
                Abort::new(Event::InvalidProfileContext, "no UserInfo claims")
            })?;
            UserInfoResponse::Claims(claims)
        };

        inv.outbound = Some(OutboundMessage::UserInfo(message));
        Ok(())
    }
}
