/*
 * Responsibility
 * - GET /api/v1/authorize
 * - End-user authentication is done by a front proxy that forwards the
 *   principal (and acr) in trusted headers
 * - Runs the authentication pipeline, persists the issued code / access token,
 *   redirects the user agent
 */
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use crate::api::v1::dto::authorize::AuthorizeParams;
use crate::context::outbound::{AuthenticationResponse, OutboundMessage, ResponseMode};
use crate::context::response::IssuedToken;
use crate::context::{
    AuthenticationResult, Invocation, RelyingPartyContext, Request, RequestBearing, ResponseType,
};
use crate::error::AppError;
use crate::pipeline::strategy;
use crate::pipeline::{Abort, ErrorObject, Flow, PipelineOutcome};
use crate::state::AppState;

pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";
pub const AUTHENTICATED_ACR_HEADER: &str = "x-authenticated-acr";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Query for code-only responses, fragment for anything returning tokens.
fn error_mode(response_type: Option<ResponseType>) -> ResponseMode {
    match response_type {
        Some(rt) if rt.is_code_only() => ResponseMode::Query,
        _ => ResponseMode::Fragment,
    }
}

/// Builds the error redirect (OIDC Core 3.1.2.6).
fn error_location(
    redirect_uri: &str,
    mode: ResponseMode,
    code: &str,
    description: &str,
    state: Option<&str>,
) -> Result<String, AppError> {
    let mut params = vec![
        ("error".to_string(), code.to_string()),
        ("error_description".to_string(), description.to_string()),
    ];
    if let Some(state) = state {
        params.push(("state".to_string(), state.to_string()));
    }
    AuthenticationResponse {
        redirect_uri: redirect_uri.to_string(),
        response_mode: mode,
        params,
    }
    .location()
    .map_err(|_| AppError::Internal)
}

/// Errors go back to the client only once its redirect URI was validated.
fn abort_response(inv: &Invocation, abort: &Abort) -> AppError {
    let validated = inv.response.as_ref().and_then(|r| r.redirect_uri.as_deref());
    let object = ErrorObject::lookup(Flow::Authentication, abort.event);

    let Some(redirect_uri) = validated.filter(|_| object.status < 500) else {
        return AppError::from_abort(Flow::Authentication, abort);
    };

    let state = inv
        .authentication_request()
        .ok()
        .and_then(|r| r.state.as_deref());
    match error_location(
        redirect_uri,
        error_mode(strategy::requested_response_type(inv)),
        object.code,
        object.description,
        state,
    ) {
        Ok(location) => AppError::Redirect { location },
        Err(e) => e,
    }
}

pub async fn authorize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AuthorizeParams>,
) -> Result<Response, AppError> {
    let request = params.into_request().map_err(AppError::invalid_request)?;

    let client = state
        .clients
        .find(&request.client_id)
        .await?
        .ok_or_else(|| AppError::invalid_request("unknown client_id"))?;

    let Some(principal) = header_value(&headers, AUTHENTICATED_USER_HEADER) else {
        // Redirect only to a URI the client registered verbatim.
        if client.metadata.redirect_uris.contains(&request.redirect_uri) {
            let location = error_location(
                &request.redirect_uri,
                error_mode(Some(ResponseType::parse(&request.response_type))),
                "login_required",
                "end-user is not authenticated",
                request.state.as_deref(),
            )?;
            return Err(AppError::Redirect { location });
        }
        return Err(AppError::invalid_request("end-user is not authenticated"));
    };

    let authentication = AuthenticationResult {
        acr: header_value(&headers, AUTHENTICATED_ACR_HEADER),
        principal,
        auth_instant: Utc::now(),
    };
    let attributes = state.directory.attributes(&authentication.principal).cloned();

    let mut inv = state
        .invocation(Request::Authentication(request))
        .with_relying_party(RelyingPartyContext::new(client))
        .with_authentication(authentication);
    if let Some(attributes) = attributes {
        inv = inv.with_user_attributes(attributes);
    }

    if let PipelineOutcome::Aborted { abort, .. } = state.pipelines.authentication.run(&mut inv) {
        return Err(abort_response(&inv, &abort));
    }

    let (code, access_token) = issued(&inv);
    if let Some(code) = code {
        state.grants.put_code(&code.value, code.claims).await?;
    }
    if let Some(token) = access_token {
        state
            .grants
            .put_access_token(&token.value, token.claims)
            .await?;
    }

    let Some(OutboundMessage::Authentication(response)) = inv.outbound.take() else {
        warn!(invocation = %inv.id(), "authentication pipeline produced no response");
        return Err(AppError::Internal);
    };
    let location = response.location().map_err(|_| AppError::Internal)?;

    info!(invocation = %inv.id(), "authentication response issued");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn issued(inv: &Invocation) -> (Option<IssuedToken>, Option<IssuedToken>) {
    match inv.response.as_ref() {
        Some(r) => (r.authorization_code.clone(), r.access_token.clone()),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_location_uses_query_for_code() {
        let location = error_location(
            "https://rp.example/cb",
            ResponseMode::Query,
            "access_denied",
            "denied",
            Some("xyz"),
        )
        .unwrap();
        assert_eq!(
            location,
            "https://rp.example/cb?error=access_denied&error_description=denied&state=xyz"
        );
    }

    #[test]
    fn error_location_uses_fragment_for_tokens() {
        let location = error_location(
            "https://rp.example/cb",
            ResponseMode::Fragment,
            "login_required",
            "not authenticated",
            None,
        )
        .unwrap();
        assert_eq!(
            location,
            "https://rp.example/cb#error=login_required&error_description=not+authenticated"
        );
    }
}
