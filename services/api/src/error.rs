//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use timeformed_core::{ErrorKind, ServiceError};
use tracing::{error, warn};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a rejected or failed domain service operation.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A request body that is not valid JSON for the expected shape.
    #[error("Malformed request body: {0}")]
    Json(#[from] JsonRejection),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    /// Shorthand for a request rejected by input validation.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Service(ServiceError::InvalidRequest(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {:?}", self);
            "An unexpected internal error occurred".to_string()
        } else {
            warn!("Request rejected ({}): {}", status, self);
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeformed_core::PortError;

    #[test]
    fn maps_service_errors_to_status_codes() {
        let cases = [
            (ServiceError::UserNotFound(1), StatusCode::NOT_FOUND),
            (ServiceError::TakeNotFound(1), StatusCode::NOT_FOUND),
            (
                ServiceError::EmailAlreadyExists("a@b.co".into()),
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::ForbiddenOperation {
                    medication_id: 1,
                    owner_id: 2,
                },
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::InvalidRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Port(PortError::Unexpected("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_failures_hide_details() {
        let response =
            ApiError::from(ServiceError::Port(PortError::Unexpected("secret dsn".into())))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
