//! Per-invocation state handed to every pipeline step.
//!
//! Each context kind is an explicit optional field. Steps reach the ones they
//! need through the capability traits below, which turn an absent context into
//! the matching terminal event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::context::metadata::{ClientMetadata, RegistrationContext, RelyingPartyContext};
use crate::context::outbound::OutboundMessage;
use crate::context::request::{
    AuthenticationRequest, RegistrationRequest, Request, TokenRequest, UserInfoRequest,
    WebFingerRequest,
};
use crate::context::response::ResponseContext;
use crate::context::signing::SigningParameters;
use crate::pipeline::event::{Abort, Event};

/// Provider-wide settings the steps consult. Read-only and shared.
#[derive(Debug, Clone)]
pub struct ProfileConfiguration {
    pub issuer: String,
    pub id_token_lifetime_seconds: i64,
    pub access_token_lifetime_seconds: i64,
    pub authorization_code_lifetime_seconds: i64,
    pub supported_response_types: Vec<String>,
    pub token_endpoint_auth_methods: Vec<String>,
    pub supported_signing_algorithms: Vec<String>,
    pub pairwise_salt: String,
}

/// Outcome of the (external) user authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub principal: String,
    pub acr: Option<String>,
    pub auth_instant: DateTime<Utc>,
}

/// Decisions handed to the consent-management subsystem.
#[derive(Debug, Clone, Default)]
pub struct ConsentContext {
    pub revoke: bool,
}

#[derive(Debug)]
pub struct Invocation {
    id: Uuid,
    pub profile: Arc<ProfileConfiguration>,
    pub request: Option<Request>,
    pub relying_party: Option<RelyingPartyContext>,
    pub signing: Option<SigningParameters>,
    pub authentication: Option<AuthenticationResult>,
    /// Attributes of the authenticated user, supplied by attribute resolution.
    pub user_attributes: Option<Map<String, Value>>,
    pub response: Option<ResponseContext>,
    pub registration: Option<RegistrationContext>,
    pub consent: Option<ConsentContext>,
    pub outbound: Option<OutboundMessage>,
    /// Terminal event recorded by the executor when a step aborts.
    pub event: Option<Abort>,
}

impl Invocation {
    pub fn new(profile: Arc<ProfileConfiguration>, request: Request) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            request: Some(request),
            relying_party: None,
            signing: None,
            authentication: None,
            user_attributes: None,
            response: None,
            registration: None,
            consent: None,
            outbound: None,
            event: None,
        }
    }

    pub fn with_relying_party(mut self, relying_party: RelyingPartyContext) -> Self {
        self.relying_party = Some(relying_party);
        self
    }

    pub fn with_signing(mut self, signing: Option<SigningParameters>) -> Self {
        self.signing = signing;
        self
    }

    pub fn with_authentication(mut self, authentication: AuthenticationResult) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn with_user_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.user_attributes = Some(attributes);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

pub trait RequestBearing {
    fn request(&self) -> Result<&Request, Abort>;

    fn authentication_request(&self) -> Result<&AuthenticationRequest, Abort> {
        match self.request()? {
            Request::Authentication(r) => Ok(r),
            other => Err(wrong_request("authentication", other)),
        }
    }

    fn token_request(&self) -> Result<&TokenRequest, Abort> {
        match self.request()? {
            Request::Token(r) => Ok(r),
            other => Err(wrong_request("token", other)),
        }
    }

    fn userinfo_request(&self) -> Result<&UserInfoRequest, Abort> {
        match self.request()? {
            Request::UserInfo(r) => Ok(r),
            other => Err(wrong_request("userinfo", other)),
        }
    }

    fn registration_request(&self) -> Result<&RegistrationRequest, Abort> {
        match self.request()? {
            Request::Registration(r) => Ok(r),
            other => Err(wrong_request("registration", other)),
        }
    }

    fn webfinger_request(&self) -> Result<&WebFingerRequest, Abort> {
        match self.request()? {
            Request::WebFinger(r) => Ok(r),
            other => Err(wrong_request("webfinger", other)),
        }
    }
}

fn wrong_request(expected: &str, actual: &Request) -> Abort {
    Abort::new(
        Event::InvalidMessageContext,
        format!("expected {expected} request, found {}", actual.kind()),
    )
}

pub trait ResponseBearing {
    fn response(&self) -> Result<&ResponseContext, Abort>;
    fn response_mut(&mut self) -> Result<&mut ResponseContext, Abort>;
}

pub trait MetadataBearing {
    fn relying_party(&self) -> Result<&RelyingPartyContext, Abort>;

    fn client_metadata(&self) -> Result<&ClientMetadata, Abort> {
        self.relying_party().map(RelyingPartyContext::metadata)
    }
}

impl RequestBearing for Invocation {
    fn request(&self) -> Result<&Request, Abort> {
        self.request
            .as_ref()
            .ok_or_else(|| Abort::new(Event::InvalidMessageContext, "no inbound message"))
    }
}

impl ResponseBearing for Invocation {
    fn response(&self) -> Result<&ResponseContext, Abort> {
        self.response
            .as_ref()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no response context"))
    }

    fn response_mut(&mut self) -> Result<&mut ResponseContext, Abort> {
        self.response
            .as_mut()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no response context"))
    }
}

impl MetadataBearing for Invocation {
    fn relying_party(&self) -> Result<&RelyingPartyContext, Abort> {
        self.relying_party.as_ref().ok_or_else(|| {
            Abort::new(
                Event::InvalidRelyingPartyContext,
                "no relying party metadata",
            )
        })
    }
}

impl Invocation {
    pub fn registration_mut(&mut self) -> Result<&mut RegistrationContext, Abort> {
        self.registration
            .as_mut()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no registration context"))
    }

    pub fn registration(&self) -> Result<&RegistrationContext, Abort> {
        self.registration
            .as_ref()
            .ok_or_else(|| Abort::new(Event::InvalidProfileContext, "no registration context"))
    }
}
