/*
 * Responsibility
 * - POST /api/v1/register (RFC 7591 / OIDC Dynamic Client Registration)
 * - Runs the registration pipeline and stores the resulting client
 */
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::warn;

use crate::api::v1::handlers::NO_STORE;
use crate::context::outbound::OutboundMessage;
use crate::context::request::RegistrationRequest;
use crate::context::{ClientInformation, ClientMetadata, Request};
use crate::error::AppError;
use crate::pipeline::{Flow, PipelineOutcome};
use crate::state::AppState;

fn invalid_metadata(description: impl Into<String>) -> AppError {
    AppError::oauth(
        "invalid_client_metadata",
        description,
        StatusCode::BAD_REQUEST,
    )
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let Value::Object(map) = body else {
        return Err(invalid_metadata("client metadata must be a JSON object"));
    };
    let metadata = ClientMetadata::from_json_map(&map).map_err(|e| invalid_metadata(e.to_string()))?;

    let mut inv = state.invocation(Request::Registration(RegistrationRequest { metadata }));
    if let PipelineOutcome::Aborted { abort, .. } = state.pipelines.registration.run(&mut inv) {
        return Err(AppError::from_abort(Flow::Registration, &abort));
    }

    let Some(OutboundMessage::Registration(response)) = inv.outbound.take() else {
        warn!(invocation = %inv.id(), "registration pipeline produced no response");
        return Err(AppError::Internal);
    };

    state
        .clients
        .insert(ClientInformation {
            client_id: response.client_id.clone(),
            client_secret: response.client_secret.clone(),
            issued_at: response.client_id_issued_at,
            metadata: response.metadata.clone(),
        })
        .await?;

    Ok((StatusCode::CREATED, NO_STORE, Json(response)).into_response())
}
