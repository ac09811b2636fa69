/*
 * Responsibility
 * - GET/POST /api/v1/userinfo (OIDC Core 5.3)
 * - Bearer token -> stored grant -> client + user attributes -> userinfo pipeline
 * - JSON claims, or application/jwt when the client registered a signing alg
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::context::outbound::{OutboundMessage, UserInfoResponse};
use crate::context::request::UserInfoRequest;
use crate::context::{RelyingPartyContext, Request};
use crate::error::AppError;
use crate::pipeline::{Flow, PipelineOutcome};
use crate::state::AppState;

/// Extracts the RFC 6750 2.1 bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn userinfo(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let access_token = bearer_token(&headers)
        .ok_or_else(|| AppError::invalid_token("bearer token required"))?
        .to_string();

    let grant = state.grants.find_access_token(&access_token).await?;
    let client = match &grant {
        Some(g) => state.clients.find(&g.client_id).await?,
        None => None,
    };
    let attributes = grant
        .as_ref()
        .and_then(|g| state.directory.attributes(&g.principal))
        .cloned();

    let mut inv = state.invocation(Request::UserInfo(UserInfoRequest {
        access_token,
        token: grant,
    }));
    if let Some(client) = client {
        inv = inv.with_relying_party(RelyingPartyContext::new(client));
    }
    if let Some(attributes) = attributes {
        inv = inv.with_user_attributes(attributes);
    }

    if let PipelineOutcome::Aborted { abort, .. } = state.pipelines.userinfo.run(&mut inv) {
        return Err(AppError::from_abort(Flow::UserInfo, &abort));
    }

    match inv.outbound.take() {
        Some(OutboundMessage::UserInfo(UserInfoResponse::Claims(claims))) => {
            Ok(Json(claims).into_response())
        }
        Some(OutboundMessage::UserInfo(UserInfoResponse::Signed(jwt))) => {
            Ok(([(header::CONTENT_TYPE, "application/jwt")], jwt).into_response())
        }
        _ => {
            warn!(invocation = %inv.id(), "userinfo pipeline produced no response");
            Err(AppError::Internal)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
