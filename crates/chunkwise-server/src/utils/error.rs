use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service error: {0}")]
    Service(String),

    #[error("Upstream service unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected upstream response shape: {0}")]
    Schema(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Validation(msg) => {
                tracing::warn!("Validation failed: {}", msg);
                (StatusCode::BAD_REQUEST, "ValidationError", msg)
            }
            ApiError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NotFoundError", msg)
            }
            ApiError::Service(msg) => {
                tracing::error!("Upstream service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "ServiceError", msg)
            }
            ApiError::Unreachable(msg) => {
                tracing::error!("Upstream service unreachable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "ServiceError", msg)
            }
            ApiError::Schema(msg) => {
                // Distinct from ServiceError so callers can tell "reachable
                // but returned garbage" from "unreachable".
                tracing::error!("Unexpected upstream response shape: {}", msg);
                (StatusCode::BAD_GATEWAY, "SchemaError", msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg)
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
