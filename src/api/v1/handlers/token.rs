/*
 * Responsibility
 * - POST /api/v1/token (authorization_code grant)
 * - Client authentication: client_secret_basic / client_secret_post / none
 * - Redeems the code from the grant store, runs the token pipeline,
 *   persists the new access token
 */
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::actions::registration::negotiate::DEFAULT_AUTH_METHOD;
use crate::api::v1::dto::token::TokenForm;
use crate::api::v1::handlers::NO_STORE;
use crate::context::outbound::OutboundMessage;
use crate::context::request::TokenRequest;
use crate::context::{ClientInformation, RelyingPartyContext, Request};
use crate::error::AppError;
use crate::pipeline::{Flow, PipelineOutcome};
use crate::state::AppState;

/// Credentials presented by the client, with the method they were sent by.
#[derive(Debug, PartialEq, Eq)]
struct ClientCredentials {
    client_id: String,
    client_secret: Option<String>,
    method: &'static str,
}

fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let malformed = || AppError::invalid_client("malformed basic credentials");

    let encoded = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or_else(malformed)?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| malformed())?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed())?;
    let (id, secret) = decoded.split_once(':').ok_or_else(malformed)?;
    Ok(Some((id.to_string(), secret.to_string())))
}

fn client_credentials(headers: &HeaderMap, form: &TokenForm) -> Result<ClientCredentials, AppError> {
    if let Some((client_id, secret)) = basic_credentials(headers)? {
        // RFC 6749 2.3: one authentication method per request
        if form.client_secret.is_some() {
            return Err(AppError::invalid_request(
                "multiple client authentication methods",
            ));
        }
        return Ok(ClientCredentials {
            client_id,
            client_secret: Some(secret),
            method: "client_secret_basic",
        });
    }

    let client_id = form
        .client_id
        .clone()
        .ok_or_else(|| AppError::invalid_client("client authentication required"))?;
    Ok(match &form.client_secret {
        Some(secret) => ClientCredentials {
            client_id,
            client_secret: Some(secret.clone()),
            method: "client_secret_post",
        },
        None => ClientCredentials {
            client_id,
            client_secret: None,
            method: "none",
        },
    })
}

fn secrets_match(expected: &str, presented: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(presented.as_bytes())
}

async fn authenticate(
    state: &AppState,
    credentials: &ClientCredentials,
) -> Result<Arc<ClientInformation>, AppError> {
    let client = state
        .clients
        .find(&credentials.client_id)
        .await?
        .ok_or_else(|| AppError::invalid_client("unknown client"))?;

    let registered = client
        .metadata
        .token_endpoint_auth_method
        .as_deref()
        .unwrap_or(DEFAULT_AUTH_METHOD);
    if registered != credentials.method {
        warn!(
            client_id = %client.client_id,
            registered,
            presented = credentials.method,
            "client authentication method mismatch"
        );
        return Err(AppError::invalid_client(
            "authentication method not registered for client",
        ));
    }
    if !state
        .profile
        .token_endpoint_auth_methods
        .iter()
        .any(|m| m == credentials.method)
    {
        return Err(AppError::invalid_client("authentication method not enabled"));
    }
    if credentials.method == "none" {
        return Ok(client);
    }

    match (&client.client_secret, &credentials.client_secret) {
        (Some(expected), Some(presented)) if secrets_match(expected, presented) => Ok(client),
        _ => {
            warn!(client_id = %client.client_id, "client secret mismatch");
            Err(AppError::invalid_client("client authentication failed"))
        }
    }
}

pub async fn token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> Result<Response, AppError> {
    form.validate().map_err(AppError::invalid_request)?;
    let credentials = client_credentials(&headers, &form)?;
    let client = authenticate(&state, &credentials).await?;

    let grant_type = form.grant_type.unwrap_or_default();
    let grant = match (grant_type.as_str(), form.code.as_deref()) {
        ("authorization_code", Some(code)) => state.grants.take_code(code).await?,
        _ => None,
    };
    let attributes = grant
        .as_ref()
        .and_then(|g| state.directory.attributes(&g.principal))
        .cloned();

    let mut inv = state
        .invocation(Request::Token(TokenRequest {
            client_id: client.client_id.clone(),
            grant_type,
            code: form.code,
            redirect_uri: form.redirect_uri,
            grant,
        }))
        .with_relying_party(RelyingPartyContext::new(client));
    if let Some(attributes) = attributes {
        inv = inv.with_user_attributes(attributes);
    }

    if let PipelineOutcome::Aborted { abort, .. } = state.pipelines.token.run(&mut inv) {
        return Err(AppError::from_abort(Flow::Token, &abort));
    }

    let access_token = inv.response.as_ref().and_then(|r| r.access_token.clone());
    if let Some(token) = access_token {
        state
            .grants
            .put_access_token(&token.value, token.claims)
            .await?;
    }

    let Some(OutboundMessage::Token(response)) = inv.outbound.take() else {
        warn!(invocation = %inv.id(), "token pipeline produced no response");
        return Err(AppError::Internal);
    };

    info!(invocation = %inv.id(), "token response issued");
    Ok((NO_STORE, Json(response)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::context::ClientMetadata;
    use crate::services::directory::UserDirectory;
    use crate::test_support::{metadata, profile};

    async fn state_with_public_client(enabled: &[&str]) -> AppState {
        let mut profile = (*profile()).clone();
        profile.token_endpoint_auth_methods = enabled.iter().map(|m| m.to_string()).collect();
        let state = AppState::new(profile, None, UserDirectory::new());
        state
            .clients
            .insert(ClientInformation {
                client_id: "public-1".into(),
                client_secret: None,
                issued_at: 1_700_000_000,
                metadata: ClientMetadata {
                    token_endpoint_auth_method: Some("none".into()),
                    ..metadata()
                },
            })
            .await
            .unwrap();
        state
    }

    fn public_credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "public-1".into(),
            client_secret: None,
            method: "none",
        }
    }

    fn form(client_id: Option<&str>, secret: Option<&str>) -> TokenForm {
        TokenForm {
            grant_type: Some("authorization_code".into()),
            code: Some("c".into()),
            client_id: client_id.map(str::to_string),
            client_secret: secret.map(str::to_string),
            ..TokenForm::default()
        }
    }

    #[test]
    fn basic_header_is_decoded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic Y2xpZW50LTE6czNjcjN0"), // client-1:s3cr3t
        );

        let credentials = client_credentials(&headers, &form(None, None)).unwrap();
        assert_eq!(
            credentials,
            ClientCredentials {
                client_id: "client-1".into(),
                client_secret: Some("s3cr3t".into()),
                method: "client_secret_basic",
            }
        );
    }

    #[test]
    fn form_credentials_select_post_or_none() {
        let headers = HeaderMap::new();
        assert_eq!(
            client_credentials(&headers, &form(Some("c1"), Some("s")))
                .unwrap()
                .method,
            "client_secret_post"
        );
        assert_eq!(
            client_credentials(&headers, &form(Some("c1"), None))
                .unwrap()
                .method,
            "none"
        );
    }

    #[test]
    fn two_methods_at_once_are_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic Y2xpZW50LTE6czNjcjN0"),
        );
        assert!(client_credentials(&headers, &form(Some("client-1"), Some("s3cr3t"))).is_err());
    }

    #[test]
    fn missing_client_id_is_invalid_client() {
        let err = client_credentials(&HeaderMap::new(), &form(None, None)).unwrap_err();
        assert!(matches!(err, AppError::OAuth { code: "invalid_client", .. }));
    }

    #[tokio::test]
    async fn public_client_needs_none_enabled() {
        let state = state_with_public_client(&["client_secret_basic"]).await;
        let err = authenticate(&state, &public_credentials()).await.unwrap_err();
        assert!(matches!(err, AppError::OAuth { code: "invalid_client", .. }));

        let state = state_with_public_client(&["client_secret_basic", "none"]).await;
        let client = authenticate(&state, &public_credentials()).await.unwrap();
        assert_eq!(client.client_id, "public-1");
    }
}
