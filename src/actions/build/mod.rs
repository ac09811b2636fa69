//! Response context builders.

pub mod acr;
pub mod claims;
pub mod consent;
pub mod expiration;
pub mod id_token;
pub mod initialize;
pub mod issue;
pub mod subject;

pub use acr::{AddAcrFromAuthorizationCode, AddAcrToIdToken, ResolveAcr};
pub use claims::SetRequestedClaims;
pub use consent::RevokeConsent;
pub use expiration::SetExpiration;
pub use id_token::AddIdTokenShell;
pub use initialize::InitializeResponseContext;
pub use issue::{IssueAccessToken, IssueAuthorizationCode};
pub use subject::{SetSubject, SetSubjectType};
