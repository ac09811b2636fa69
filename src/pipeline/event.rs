//! Terminal events and the error objects the host renders for them.

use std::fmt;

use thiserror::Error;

/// The reason a step stopped the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Event {
    #[error("invalid message context")]
    InvalidMessageContext,
    #[error("invalid relying party context")]
    InvalidRelyingPartyContext,
    #[error("invalid profile context")]
    InvalidProfileContext,
    #[error("invalid message")]
    InvalidMessage,
    #[error("invalid security configuration")]
    InvalidSecurityConfiguration,
    #[error("invalid redirect uri")]
    InvalidRedirectUri,
    #[error("invalid response type")]
    InvalidResponseType,
    #[error("invalid grant type")]
    InvalidGrantType,
    #[error("invalid grant")]
    InvalidGrant,
    #[error("invalid subject")]
    InvalidSubject,
    #[error("invalid access token")]
    InvalidToken,
    #[error("invalid webfinger rel")]
    InvalidWebFingerRel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required context or sub-context is absent.
    MissingContext,
    /// Input is present but semantically invalid.
    InvalidMessage,
    /// Signing material is absent or incompatible.
    SecurityConfiguration,
    /// Requested values conflict with the registered metadata.
    BusinessRule,
}

impl Event {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Event::InvalidMessageContext
            | Event::InvalidRelyingPartyContext
            | Event::InvalidProfileContext => ErrorKind::MissingContext,
            Event::InvalidMessage | Event::InvalidWebFingerRel => ErrorKind::InvalidMessage,
            Event::InvalidSecurityConfiguration => ErrorKind::SecurityConfiguration,
            Event::InvalidRedirectUri
            | Event::InvalidResponseType
            | Event::InvalidGrantType
            | Event::InvalidGrant
            | Event::InvalidSubject
            | Event::InvalidToken => ErrorKind::BusinessRule,
        }
    }
}

/// Step failure: the terminal event plus a detail line for the logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event}: {detail}")]
pub struct Abort {
    pub event: Event,
    pub detail: String,
}

impl Abort {
    pub fn new(event: Event, detail: impl Into<String>) -> Self {
        Self {
            event,
            detail: detail.into(),
        }
    }
}

impl From<Event> for Abort {
    fn from(event: Event) -> Self {
        Self {
            event,
            detail: event.to_string(),
        }
    }
}

/// Protocol flow a pipeline serves; selects the error vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Authentication,
    Token,
    UserInfo,
    Registration,
    WebFinger,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flow::Authentication => "authentication",
            Flow::Token => "token",
            Flow::UserInfo => "userinfo",
            Flow::Registration => "registration",
            Flow::WebFinger => "webfinger",
        })
    }
}

/// Error payload selected for a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorObject {
    pub code: &'static str,
    pub description: &'static str,
    pub status: u16,
}

impl ErrorObject {
    const fn new(code: &'static str, description: &'static str, status: u16) -> Self {
        Self {
            code,
            description,
            status,
        }
    }

    /// Maps a terminal event to the error object of the given flow.
    pub fn lookup(flow: Flow, event: Event) -> Self {
        if event.kind() == ErrorKind::SecurityConfiguration {
            return Self::new("server_error", "signing configuration unavailable", 500);
        }

        match (flow, event) {
            (Flow::Registration, Event::InvalidRedirectUri) => Self::new(
                "invalid_redirect_uri",
                "one or more redirect_uri values are invalid",
                400,
            ),
            (Flow::Registration, _) => Self::new(
                "invalid_client_metadata",
                "client metadata is invalid",
                400,
            ),
            (Flow::Token, Event::InvalidRelyingPartyContext) => {
                Self::new("invalid_client", "client authentication failed", 401)
            }
            (Flow::Token, Event::InvalidGrantType) => Self::new(
                "unauthorized_client",
                "grant type not registered for client",
                400,
            ),
            (Flow::Token, Event::InvalidGrant | Event::InvalidSubject) => Self::new(
                "invalid_grant",
                "authorization grant is invalid",
                400,
            ),
            (Flow::UserInfo, Event::InvalidToken | Event::InvalidRelyingPartyContext) => {
                Self::new("invalid_token", "access token is invalid", 401)
            }
            (Flow::Authentication, Event::InvalidResponseType) => Self::new(
                "unsupported_response_type",
                "response type not registered for client",
                400,
            ),
            (Flow::Authentication, Event::InvalidRedirectUri) => Self::new(
                "invalid_request",
                "redirect_uri not registered for client",
                400,
            ),
            (Flow::Authentication, Event::InvalidSubject) => Self::new(
                "invalid_request",
                "requested subject does not match",
                400,
            ),
            (Flow::WebFinger, Event::InvalidWebFingerRel) => {
                Self::new("invalid_request", "unsupported rel", 400)
            }
            (_, Event::InvalidProfileContext) => {
                Self::new("server_error", "request could not be processed", 500)
            }
            _ => Self::new("invalid_request", "request is invalid", 400),
        }
    }
}
