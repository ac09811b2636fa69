/*
 * Responsibility
 * - v1 URL layout: OP endpoints under /api/v1
 * - Discovery documents at the root /.well-known/ paths
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    authorize::authorize,
    discovery::openid_configuration,
    health::health,
    register::register,
    token::token,
    userinfo::userinfo,
    webfinger::webfinger,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", get(authorize))
        .route("/token", post(token))
        .route("/userinfo", get(userinfo).post(userinfo))
        .route("/register", post(register))
}

pub fn well_known_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(openid_configuration),
        )
        .route("/.well-known/webfinger", get(webfinger))
}
