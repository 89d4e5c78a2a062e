use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use common::Error;

/// Maps domain errors onto HTTP responses with a `{"message": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    /// Message used when `error` is a validation failure.
    invalid_message: &'static str,
}

impl ApiError {
    /// Errors raised while reading a PATCH body rather than a webhook payload.
    pub fn request_body(error: Error) -> Self {
        Self {
            error,
            invalid_message: "Invalid request body",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            error,
            invalid_message: "Invalid signal data",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.error {
            Error::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": self.invalid_message, "errors": errors }),
            ),
            Error::InvalidJson => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid JSON payload" }),
            ),
            Error::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthorized" }),
            ),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("{what} not found") }),
            ),
            Error::Network(e) => {
                error!(error = %e, "Upstream failure");
                (StatusCode::BAD_GATEWAY, json!({ "message": "Upstream error" }))
            }
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
