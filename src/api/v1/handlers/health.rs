/*
 * Responsibility
 * - GET /api/v1/health (liveness, reports the issuer served)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "issuer": state.profile.issuer,
            "signing": state.signing.is_some(),
        })),
    )
}
