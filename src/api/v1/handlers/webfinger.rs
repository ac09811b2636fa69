/*
 * Responsibility
 * - GET /.well-known/webfinger (OpenID Connect Discovery 1.0, section 2)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::v1::dto::webfinger::WebFingerParams;
use crate::context::Request;
use crate::context::outbound::OutboundMessage;
use crate::error::AppError;
use crate::pipeline::{Flow, PipelineOutcome};
use crate::state::AppState;

pub async fn webfinger(
    State(state): State<AppState>,
    Query(params): Query<WebFingerParams>,
) -> Result<Response, AppError> {
    let request = params.into_request().map_err(AppError::invalid_request)?;

    let mut inv = state.invocation(Request::WebFinger(request));
    if let PipelineOutcome::Aborted { abort, .. } = state.pipelines.webfinger.run(&mut inv) {
        return Err(AppError::from_abort(Flow::WebFinger, &abort));
    }

    let Some(OutboundMessage::WebFinger(response)) = inv.outbound.take() else {
        warn!(invocation = %inv.id(), "webfinger pipeline produced no response");
        return Err(AppError::Internal);
    };
    Ok(([(header::CONTENT_TYPE, "application/jrd+json")], Json(response)).into_response())
}
