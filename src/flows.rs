//! The ordered step lists for each endpoint.
//!
//! Order matters: validation precedes claim population, tokens are issued
//! before their hashes are computed, and the subject is resolved before the
//! ID Token is built and signed.

use std::sync::Arc;

use crate::actions::build::{
    AddAcrFromAuthorizationCode, AddAcrToIdToken, AddIdTokenShell, InitializeResponseContext,
    IssueAccessToken, IssueAuthorizationCode, ResolveAcr, RevokeConsent, SetExpiration,
    SetRequestedClaims, SetSubject, SetSubjectType,
};
use crate::actions::message::{
    FormAuthenticationResponse, FormRegistrationResponse, FormTokenResponse,
    FormWebFingerResponse,
};
use crate::actions::registration::{
    AddApplicationType, AddClientName, AddContacts, AddGrantTypes, AddLocalizedUri,
    AddRedirectUris, AddResponseTypes, AddScope, AddSigningAlgorithms, AddSubjectType,
    AddTokenEndpointAuthMethod, CheckRedirectUris, InitializeRegistrationContext,
    IssueClientCredentials, LocalizedUri,
};
use crate::actions::token::{
    FormUserInfoResponse, ResolveUserInfoClaims, SetAccessTokenHash, SetCodeHash, SignIdToken,
    SignUserInfoClaims,
};
use crate::actions::validate::{
    ValidateAccessToken, ValidateAuthorizationGrant, ValidateGrantType, ValidateRedirectUri,
    ValidateResponseType, ValidateScope, ValidateSubject, ValidateWebFingerRel,
};
use crate::pipeline::{Flow, Pipeline};

/// Authorization endpoint: code, implicit and hybrid flows.
pub fn authentication() -> Pipeline {
    Pipeline::new(Flow::Authentication)
        .then(InitializeResponseContext)
        .then(ValidateRedirectUri::default())
        .then(ValidateResponseType::default())
        .then(ValidateScope::default())
        .then(SetRequestedClaims::default())
        .then(ResolveAcr)
        .then(SetSubjectType::default())
        .then(SetSubject::default())
        .then(ValidateSubject::default())
        .then(RevokeConsent::default())
        .then(SetExpiration::default())
        .then(IssueAuthorizationCode)
        .then(IssueAccessToken::default())
        .then(AddIdTokenShell)
        .then(AddAcrToIdToken)
        .then(SetAccessTokenHash)
        .then(SetCodeHash)
        .then(SignIdToken)
        .then(FormAuthenticationResponse)
}

/// Token endpoint: authorization code redemption.
pub fn token() -> Pipeline {
    Pipeline::new(Flow::Token)
        .then(InitializeResponseContext)
        .then(ValidateGrantType)
        .then(ValidateAuthorizationGrant)
        .then(ValidateScope::default())
        .then(SetRequestedClaims::default())
        .then(SetSubject::default())
        .then(ValidateSubject::default())
        .then(SetExpiration::default())
        .then(IssueAccessToken::default())
        .then(AddIdTokenShell)
        .then(AddAcrFromAuthorizationCode)
        .then(SetAccessTokenHash)
        .then(SignIdToken)
        .then(FormTokenResponse)
}

pub fn userinfo() -> Pipeline {
    Pipeline::new(Flow::UserInfo)
        .then(InitializeResponseContext)
        .then(ValidateAccessToken)
        .then(ValidateScope::default())
        .then(SetRequestedClaims::default())
        .then(SetSubject::default())
        .then(ResolveUserInfoClaims)
        .then(SignUserInfoClaims)
        .then(FormUserInfoResponse)
}

pub fn registration() -> Pipeline {
    Pipeline::new(Flow::Registration)
        .then(InitializeRegistrationContext)
        .then(AddApplicationType)
        .then(CheckRedirectUris)
        .then(AddRedirectUris)
        .then(AddResponseTypes)
        .then(AddGrantTypes)
        .then(AddClientName)
        .then(AddContacts)
        .then(AddLocalizedUri::new(LocalizedUri::Logo))
        .then(AddLocalizedUri::new(LocalizedUri::Client))
        .then(AddLocalizedUri::new(LocalizedUri::Policy))
        .then(AddLocalizedUri::new(LocalizedUri::TermsOfService))
        .then(AddScope)
        .then(AddSubjectType)
        .then(AddTokenEndpointAuthMethod::default())
        .then(AddSigningAlgorithms)
        .then(IssueClientCredentials)
        .then(FormRegistrationResponse)
}

pub fn webfinger() -> Pipeline {
    Pipeline::new(Flow::WebFinger)
        .then(ValidateWebFingerRel)
        .then(FormWebFingerResponse)
}

/// One shared instance of every standard pipeline.
#[derive(Debug, Clone)]
pub struct Pipelines {
    pub authentication: Arc<Pipeline>,
    pub token: Arc<Pipeline>,
    pub userinfo: Arc<Pipeline>,
    pub registration: Arc<Pipeline>,
    pub webfinger: Arc<Pipeline>,
}

impl Pipelines {
    pub fn standard() -> Self {
        Self {
            authentication: Arc::new(authentication()),
            token: Arc::new(token()),
            userinfo: Arc::new(userinfo()),
            registration: Arc::new(registration()),
            webfinger: Arc::new(webfinger()),
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::context::outbound::{OutboundMessage, ResponseMode};
    use crate::context::request::{RegistrationRequest, Request};
    use crate::context::{ClientMetadata, Invocation};
    use crate::pipeline::{Event, PipelineOutcome};
    use crate::test_support::{
        authenticated, authentication_request, client, invocation, jwt_payload, signing,
        token_request,
    };

    fn authorize(response_type: &str) -> Invocation {
        let mut request = authentication_request();
        request.response_type = response_type.into();
        invocation(Request::Authentication(request))
            .with_relying_party(client(|_| {}))
            .with_signing(Some(signing()))
            .with_authentication(authenticated("alice"))
    }

    fn left_half_sha256(value: &str) -> String {
        URL_SAFE_NO_PAD.encode(&Sha256::digest(value.as_bytes())[..16])
    }

    #[test]
    fn code_flow_redirects_with_code_in_query() {
        let mut inv = authorize("code");
        assert_eq!(authentication().run(&mut inv), PipelineOutcome::Completed);

        let Some(OutboundMessage::Authentication(response)) = &inv.outbound else {
            panic!("expected authentication response");
        };
        assert_eq!(response.response_mode, ResponseMode::Query);
        assert!(response.param("code").is_some());
        assert!(response.param("id_token").is_none());
        assert_eq!(response.param("state"), Some("xyz"));
    }

    #[test]
    fn hybrid_flow_binds_code_into_id_token() {
        let mut inv = authorize("code id_token");
        assert!(authentication().run(&mut inv).is_completed());

        let Some(OutboundMessage::Authentication(response)) = &inv.outbound else {
            panic!("expected authentication response");
        };
        let code = response.param("code").unwrap();
        let claims = jwt_payload(response.param("id_token").unwrap());
        assert_eq!(claims["c_hash"], left_half_sha256(code));
        assert!(claims.get("at_hash").is_none());
        assert_eq!(claims["acr"], "urn:mace:incommon:iap:silver");
        assert_eq!(claims["nonce"], "n-0S6_WzA2Mj");
    }

    #[test]
    fn implicit_flow_binds_access_token_into_id_token() {
        let mut inv = authorize("id_token token");
        assert!(authentication().run(&mut inv).is_completed());

        let Some(OutboundMessage::Authentication(response)) = &inv.outbound else {
            panic!("expected authentication response");
        };
        let claims = jwt_payload(response.param("id_token").unwrap());
        assert_eq!(
            claims["at_hash"],
            left_half_sha256(response.param("access_token").unwrap())
        );
        assert_eq!(response.response_mode, ResponseMode::Fragment);
    }

    #[test]
    fn unregistered_response_type_aborts_before_claims() {
        let mut request = authentication_request();
        request.response_type = "id_token".into();
        let mut inv = invocation(Request::Authentication(request))
            .with_relying_party(client(|m| m.response_types = vec!["code".into()]))
            .with_signing(Some(signing()))
            .with_authentication(authenticated("alice"));

        let outcome = authentication().run(&mut inv);
        assert!(matches!(
            outcome,
            PipelineOutcome::Aborted { step: "validate_response_type", .. }
        ));
        assert_eq!(inv.event.unwrap().event, Event::InvalidResponseType);
        let response = inv.response.unwrap();
        assert!(response.subject.is_none());
        assert!(response.scope.is_none());
        assert!(inv.outbound.is_none());
    }

    #[test]
    fn unregistered_redirect_uri_stops_at_code_issuance() {
        let mut request = authentication_request();
        request.redirect_uri = "https://evil.example/cb".into();
        let mut inv = invocation(Request::Authentication(request))
            .with_relying_party(client(|_| {}))
            .with_signing(Some(signing()))
            .with_authentication(authenticated("alice"));

        let outcome = authentication().run(&mut inv);
        assert!(matches!(
            outcome,
            PipelineOutcome::Aborted { step: "issue_authorization_code", .. }
        ));
        assert_eq!(inv.event.unwrap().event, Event::InvalidRedirectUri);
    }

    #[test]
    fn id_token_flow_without_signing_key_is_a_server_error() {
        let mut inv = authorize("code id_token").with_signing(None);
        let outcome = authentication().run(&mut inv);
        assert!(matches!(
            outcome,
            PipelineOutcome::Aborted { step: "sign_id_token", .. }
        ));
    }

    #[test]
    fn offline_access_revokes_consent() {
        let mut request = authentication_request();
        request.scope = crate::context::Scope::parse("openid offline_access");
        let mut inv = invocation(Request::Authentication(request))
            .with_relying_party(client(|_| {}))
            .with_signing(Some(signing()))
            .with_authentication(authenticated("alice"));

        assert!(authentication().run(&mut inv).is_completed());
        assert!(inv.consent.unwrap().revoke);
    }

    #[test]
    fn code_redemption_returns_signed_id_token() {
        let mut authz = authorize("code");
        assert!(authentication().run(&mut authz).is_completed());
        let code = authz.response.unwrap().authorization_code.unwrap();

        let mut inv = invocation(Request::Token(token_request(Some(code.claims))))
            .with_relying_party(client(|_| {}))
            .with_signing(Some(signing()));
        assert_eq!(token().run(&mut inv), PipelineOutcome::Completed);

        let Some(OutboundMessage::Token(response)) = &inv.outbound else {
            panic!("expected token response");
        };
        let claims = jwt_payload(response.id_token.as_deref().unwrap());
        assert_eq!(claims["sub"], "alice");
        assert_eq!(claims["at_hash"], left_half_sha256(&response.access_token));
        assert_eq!(claims["acr"], "urn:mace:incommon:iap:silver");
        assert!(claims.get("c_hash").is_none());
        assert_eq!(response.scope.as_deref(), Some("openid profile"));
    }

    #[test]
    fn registration_applies_defaults() {
        let metadata = ClientMetadata {
            redirect_uris: vec!["https://rp.example/cb".into()],
            ..Default::default()
        };
        let mut inv = invocation(Request::Registration(RegistrationRequest { metadata }));
        assert!(registration().run(&mut inv).is_completed());

        let Some(OutboundMessage::Registration(response)) = &inv.outbound else {
            panic!("expected registration response");
        };
        let out = &response.metadata;
        assert_eq!(out.application_type.as_deref(), Some("web"));
        assert_eq!(out.scope.as_deref(), Some("openid"));
        assert_eq!(out.subject_type.as_deref(), Some("public"));
        assert_eq!(out.response_types, vec!["code"]);
        assert_eq!(out.grant_types, vec!["authorization_code"]);
        assert_eq!(out.token_endpoint_auth_method.as_deref(), Some("client_secret_basic"));
        assert!(response.client_secret.is_some());
    }

    #[test]
    fn standard_pipelines_are_ordered() {
        let names = authentication().step_names();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(pos("validate_response_type") < pos("set_subject"));
        assert!(pos("issue_access_token") < pos("set_access_token_hash"));
        assert!(pos("issue_authorization_code") < pos("set_code_hash"));
        assert!(pos("set_code_hash") < pos("sign_id_token"));
        assert!(pos("set_subject") < pos("add_id_token_shell"));
    }
}
