//! Token assembly: hash claims, signing and UserInfo output.

pub mod hash;
pub mod sign;
pub mod userinfo;

pub use hash::{SetAccessTokenHash, SetCodeHash};
pub use sign::SignIdToken;
pub use userinfo::{FormUserInfoResponse, ResolveUserInfoClaims, SignUserInfoClaims};
