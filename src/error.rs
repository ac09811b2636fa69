/*
 * Responsibility
 * - Host-level AppError
 * - IntoResponse: OAuth 2.0 error bodies ({error, error_description}) and error redirects
 * - Mapping of pipeline aborts and store failures into AppError
 */
use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::pipeline::{Abort, ErrorObject, Flow};
use crate::services::clients::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub error_description: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {description}")]
    OAuth {
        code: &'static str,
        description: String,
        status: StatusCode,
    },
    /// Authorization endpoint errors delivered to the client's redirect URI.
    #[error("error redirected to client")]
    Redirect { location: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn oauth(code: &'static str, description: impl Into<String>, status: StatusCode) -> Self {
        Self::OAuth {
            code,
            description: description.into(),
            status,
        }
    }

    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::oauth("invalid_request", description, StatusCode::BAD_REQUEST)
    }

    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::oauth("invalid_client", description, StatusCode::UNAUTHORIZED)
    }

    pub fn invalid_token(description: impl Into<String>) -> Self {
        Self::oauth("invalid_token", description, StatusCode::UNAUTHORIZED)
    }

    /// Error payload for a pipeline that aborted while serving `flow`.
    pub fn from_abort(flow: Flow, abort: &Abort) -> Self {
        let object = ErrorObject::lookup(flow, abort.event);
        let status =
            StatusCode::from_u16(object.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::oauth(object.code, object.description, status)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::OAuth {
                code,
                description,
                status,
            } => {
                let body = Json(ErrorResponse {
                    error: code,
                    error_description: description,
                });
                if status == StatusCode::UNAUTHORIZED {
                    // RFC 6750 3 / RFC 6749 5.2
                    let challenge = if code == "invalid_token" {
                        format!("Bearer error=\"{code}\"")
                    } else {
                        "Basic".to_string()
                    };
                    (status, [(header::WWW_AUTHENTICATE, challenge)], body).into_response()
                } else {
                    (status, body).into_response()
                }
            }
            AppError::Redirect { location } => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "server_error",
                    error_description: "internal server error".into(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "store failure");
        AppError::Internal
    }
}
