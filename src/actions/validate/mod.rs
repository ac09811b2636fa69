//! Request validators. Each reads the registered metadata and writes at most
//! one validated value into the response context.

pub mod access_token;
pub mod grant;
pub mod grant_type;
pub mod redirect_uri;
pub mod response_type;
pub mod scope;
pub mod subject;
pub mod webfinger;

pub use access_token::ValidateAccessToken;
pub use grant::ValidateAuthorizationGrant;
pub use grant_type::ValidateGrantType;
pub use redirect_uri::ValidateRedirectUri;
pub use response_type::ValidateResponseType;
pub use scope::ValidateScope;
pub use subject::ValidateSubject;
pub use webfinger::ValidateWebFingerRel;
