//! HTTP error mapping.
//!
//! Not-found and validation failures carry their message to the
//! client. Storage and integrity failures are logged in full and the
//! client gets a generic message; their detail never leaves the
//! process.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use provreg_core::error::RegistryError;

use crate::api::response::ApiResponse;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("Could not find {entity} with id={id}"),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            RegistryError::Validation(message) => Self {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            RegistryError::DataIntegrity(_)
            | RegistryError::Database(_)
            | RegistryError::Internal(_) => {
                tracing::error!(error = %err, "request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "An unexpected error occurred".into(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<serde_json::Value>::failure(self.message)),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
