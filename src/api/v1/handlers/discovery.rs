/*
 * Responsibility
 * - GET /.well-known/openid-configuration (OIDC Discovery 1.0, section 3)
 * - Advertises only what the configured profile and pipelines support
 */
use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn openid_configuration(State(state): State<AppState>) -> Json<Value> {
    let profile = &state.profile;
    let base = format!("{}/api/v1", profile.issuer.trim_end_matches('/'));

    Json(json!({
        "issuer": profile.issuer,
        "authorization_endpoint": format!("{base}/authorize"),
        "token_endpoint": format!("{base}/token"),
        "userinfo_endpoint": format!("{base}/userinfo"),
        "registration_endpoint": format!("{base}/register"),
        "response_types_supported": profile.supported_response_types,
        "response_modes_supported": ["query", "fragment"],
        "grant_types_supported": ["authorization_code", "implicit"],
        "subject_types_supported": ["public", "pairwise"],
        "id_token_signing_alg_values_supported": profile.supported_signing_algorithms,
        "userinfo_signing_alg_values_supported": profile.supported_signing_algorithms,
        "token_endpoint_auth_methods_supported": profile.token_endpoint_auth_methods,
        "scopes_supported": ["openid", "profile", "email", "address", "phone", "offline_access"],
        "claims_parameter_supported": true,
    }))
}
