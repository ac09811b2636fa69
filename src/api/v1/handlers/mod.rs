pub mod authorize;
pub mod discovery;
pub mod health;
pub mod register;
pub mod token;
pub mod userinfo;
pub mod webfinger;

use axum::http::header;

/// Token-bearing responses must not be cached (RFC 6749 5.1).
pub(crate) const NO_STORE: [(header::HeaderName, &str); 2] = [
    (header::CACHE_CONTROL, "no-store"),
    (header::PRAGMA, "no-cache"),
];
