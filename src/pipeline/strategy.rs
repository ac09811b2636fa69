//! Lookup strategies: small pluggable functions a step consults to obtain a
//! value from the invocation. Each step takes its strategies as function
//! values and falls back to the defaults defined here.

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use crate::context::metadata::ClientMetadata;
use crate::context::request::{ClaimsRequest, GrantClaims, Request};
use crate::context::response::SubjectType;
use crate::context::scope::{ResponseType, Scope};
use crate::context::{Invocation, MetadataBearing, RequestBearing, ResponseBearing};
use crate::services::signing::hash::pairwise_subject;

pub type Lookup<T> = Arc<dyn Fn(&Invocation) -> Option<T> + Send + Sync>;

pub fn lookup<T, F>(f: F) -> Lookup<T>
where
    F: Fn(&Invocation) -> Option<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Claims bound to the redeemed code (token flow) or the presented access
/// token (userinfo flow).
pub fn grant_claims(inv: &Invocation) -> Option<&GrantClaims> {
    match inv.request().ok()? {
        Request::Token(r) => r.grant.as_ref(),
        Request::UserInfo(r) => r.token.as_ref(),
        _ => None,
    }
}

pub fn requested_scope(inv: &Invocation) -> Option<Scope> {
    match inv.request().ok()? {
        Request::Authentication(r) => Some(r.scope.clone()),
        _ => grant_claims(inv).map(|g| g.scope.clone()),
    }
}

pub fn requested_response_type(inv: &Invocation) -> Option<ResponseType> {
    inv.authentication_request()
        .ok()
        .map(|r| ResponseType::parse(&r.response_type))
}

pub fn requested_redirect_uri(inv: &Invocation) -> Option<String> {
    match inv.request().ok()? {
        Request::Authentication(r) => Some(r.redirect_uri.clone()),
        Request::Token(r) => r.redirect_uri.clone(),
        _ => None,
    }
}

pub fn requested_claims(inv: &Invocation) -> Option<ClaimsRequest> {
    match inv.request().ok()? {
        Request::Authentication(r) => r.claims.clone(),
        _ => grant_claims(inv).and_then(|g| g.requested_claims.clone()),
    }
}

/// The `sub` value the client explicitly asked for.
pub fn requested_subject(inv: &Invocation) -> Option<String> {
    requested_claims(inv).and_then(|c| c.requested_subject().map(str::to_string))
}

pub fn prompt(inv: &Invocation) -> Option<String> {
    inv.authentication_request()
        .ok()
        .and_then(|r| r.prompt.clone())
}

pub fn subject_type(inv: &Invocation) -> Option<SubjectType> {
    let registered = inv
        .client_metadata()
        .ok()
        .and_then(|m| m.subject_type.as_deref());
    match registered {
        Some(raw) => SubjectType::parse(raw),
        None => Some(SubjectType::Public),
    }
}

/// Subject for the response.
///
/// Token and userinfo flows reuse the subject bound to the grant. The
/// authentication flow derives it from the authenticated principal, applying
/// the pairwise transform when the resolved subject type asks for it.
pub fn subject(inv: &Invocation) -> Option<String> {
    if let Some(grant) = grant_claims(inv) {
        return Some(grant.subject.clone());
    }

    let principal = &inv.authentication.as_ref()?.principal;
    let subject_type = inv
        .response()
        .ok()
        .and_then(|r| r.subject_type)
        .unwrap_or(SubjectType::Public);

    match subject_type {
        SubjectType::Public => Some(principal.clone()),
        SubjectType::Pairwise => {
            let metadata = inv.client_metadata().ok()?;
            let validated = inv.response().ok().and_then(|r| r.redirect_uri.as_deref());
            let sector = sector_identifier(metadata, validated)?;
            Some(pairwise_subject(&sector, principal, &inv.profile.pairwise_salt))
        }
    }
}

/// Host component of the sector identifier URI, else of the redirect URI.
pub fn sector_identifier(metadata: &ClientMetadata, redirect_uri: Option<&str>) -> Option<String> {
    let source = metadata
        .sector_identifier_uri
        .as_deref()
        .or(redirect_uri)
        .or_else(|| metadata.redirect_uris.first().map(String::as_str))?;
    Url::parse(source).ok()?.host_str().map(str::to_string)
}

pub fn id_token_lifetime(inv: &Invocation) -> Option<i64> {
    Some(inv.profile.id_token_lifetime_seconds)
}

pub fn access_token_lifetime(inv: &Invocation) -> Option<i64> {
    Some(inv.profile.access_token_lifetime_seconds)
}

pub fn enabled_auth_methods(inv: &Invocation) -> Option<Vec<String>> {
    Some(inv.profile.token_endpoint_auth_methods.clone())
}

pub fn acr(inv: &Invocation) -> Option<String> {
    inv.response().ok().and_then(|r| r.acr.clone())
}

pub fn auth_time(inv: &Invocation) -> Option<i64> {
    if let Some(grant) = grant_claims(inv) {
        return grant.auth_time;
    }
    inv.authentication
        .as_ref()
        .map(|a| a.auth_instant.timestamp())
}

pub fn nonce(inv: &Invocation) -> Option<String> {
    match inv.request().ok()? {
        Request::Authentication(r) => r.nonce.clone(),
        _ => grant_claims(inv).and_then(|g| g.nonce.clone()),
    }
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}
