//! Fixtures shared by the unit tests.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::Value;

use crate::context::request::{
    AuthenticationRequest, GrantClaims, RegistrationRequest, Request, TokenRequest,
};
use crate::context::{
    AuthenticationResult, ClientInformation, ClientMetadata, Invocation, ProfileConfiguration,
    RegistrationContext, RelyingPartyContext, ResponseContext, Scope, SigningParameters,
};

pub const ISSUER: &str = "https://op.example";
pub const CLIENT_ID: &str = "client-1";
pub const REDIRECT_URI: &str = "https://rp.example/cb";

pub fn profile() -> Arc<ProfileConfiguration> {
    Arc::new(ProfileConfiguration {
        issuer: ISSUER.into(),
        id_token_lifetime_seconds: 3600,
        access_token_lifetime_seconds: 600,
        authorization_code_lifetime_seconds: 300,
        supported_response_types: vec![
            "code".into(),
            "id_token".into(),
            "id_token token".into(),
            "code id_token".into(),
        ],
        token_endpoint_auth_methods: vec![
            "client_secret_basic".into(),
            "client_secret_post".into(),
        ],
        supported_signing_algorithms: vec!["HS256".into(), "RS256".into()],
        pairwise_salt: "test-salt".into(),
    })
}

pub fn metadata() -> ClientMetadata {
    ClientMetadata {
        redirect_uris: vec![REDIRECT_URI.into()],
        response_types: vec!["code".into(), "code id_token".into(), "id_token token".into()],
        grant_types: vec!["authorization_code".into(), "implicit".into()],
        scope: Some("openid profile email offline_access".into()),
        ..ClientMetadata::default()
    }
}

pub fn client(customize: impl FnOnce(&mut ClientMetadata)) -> RelyingPartyContext {
    let mut metadata = metadata();
    customize(&mut metadata);
    RelyingPartyContext::new(Arc::new(ClientInformation {
        client_id: CLIENT_ID.into(),
        client_secret: Some("secret".into()),
        issued_at: 1_700_000_000,
        metadata,
    }))
}

pub fn invocation(request: Request) -> Invocation {
    Invocation::new(profile(), request)
}

/// Invocation with an empty response context and the default client.
pub fn prepared(request: Request) -> Invocation {
    let mut inv = invocation(request).with_relying_party(client(|_| {}));
    inv.response = Some(ResponseContext::new());
    inv
}

/// Registration invocation with its registration context already created.
pub fn registering(metadata: ClientMetadata) -> Invocation {
    let mut inv = invocation(Request::Registration(RegistrationRequest {
        metadata: metadata.clone(),
    }));
    inv.registration = Some(RegistrationContext::new(metadata));
    inv
}

pub fn authentication_request() -> AuthenticationRequest {
    AuthenticationRequest {
        client_id: CLIENT_ID.into(),
        response_type: "code".into(),
        redirect_uri: REDIRECT_URI.into(),
        scope: Scope::parse("openid profile"),
        state: Some("xyz".into()),
        nonce: Some("n-0S6_WzA2Mj".into()),
        prompt: None,
        response_mode: None,
        claims: None,
    }
}

pub fn authenticated(principal: &str) -> AuthenticationResult {
    AuthenticationResult {
        principal: principal.into(),
        acr: Some("urn:mace:incommon:iap:silver".into()),
        auth_instant: Utc::now(),
    }
}

pub fn grant() -> GrantClaims {
    GrantClaims {
        client_id: CLIENT_ID.into(),
        subject: "alice".into(),
        principal: "alice".into(),
        scope: Scope::parse("openid profile"),
        acr: Some("urn:acr:password".into()),
        nonce: Some("n-0S6_WzA2Mj".into()),
        auth_time: Some(Utc::now().timestamp() - 10),
        requested_claims: None,
        redirect_uri: Some(REDIRECT_URI.into()),
        expires_at: Utc::now().timestamp() + 300,
    }
}

pub fn token_request(grant: Option<GrantClaims>) -> TokenRequest {
    TokenRequest {
        client_id: CLIENT_ID.into(),
        grant_type: "authorization_code".into(),
        code: Some("code-123".into()),
        redirect_uri: Some(REDIRECT_URI.into()),
        grant,
    }
}

pub fn signing() -> SigningParameters {
    SigningParameters::hmac("HS256", b"0123456789abcdef0123456789abcdef", Some("k1".into()))
}

/// Decodes the payload of a compact JWS without verifying it.
pub fn jwt_payload(token: &str) -> Value {
    let payload = token.split('.').nth(1).expect("jws payload segment");
    let bytes = URL_SAFE_NO_PAD.decode(payload).expect("base64url payload");
    serde_json::from_slice(&bytes).expect("json payload")
}
