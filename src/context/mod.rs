//! Typed invocation state: requests, response accumulator, metadata, signing.

pub mod invocation;
pub mod metadata;
pub mod outbound;
pub mod request;
pub mod response;
pub mod scope;
pub mod signing;

pub use invocation::{
    AuthenticationResult, ConsentContext, Invocation, MetadataBearing, ProfileConfiguration,
    RequestBearing, ResponseBearing,
};
pub use metadata::{ClientInformation, ClientMetadata, RegistrationContext, RelyingPartyContext};
pub use request::{GrantClaims, Request};
pub use response::{ResponseContext, SubjectType};
pub use scope::{ResponseType, Scope};
pub use signing::SigningParameters;
