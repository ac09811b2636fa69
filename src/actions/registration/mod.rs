//! Client registration (OIDC Dynamic Registration / RFC 7591). Each builder
//! moves one field from the requested metadata to the registered record.

pub mod credentials;
pub mod fields;
pub mod initialize;
pub mod negotiate;
pub mod redirect_uris;

pub use credentials::IssueClientCredentials;
pub use fields::{
    AddApplicationType, AddClientName, AddContacts, AddLocalizedUri, AddRedirectUris, LocalizedUri,
};
pub use initialize::InitializeRegistrationContext;
pub use negotiate::{
    AddGrantTypes, AddResponseTypes, AddScope, AddSigningAlgorithms, AddSubjectType,
    AddTokenEndpointAuthMethod,
};
pub use redirect_uris::CheckRedirectUris;
