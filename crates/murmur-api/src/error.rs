use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use murmur_types::api::ApiResponse;

/// Request-boundary error taxonomy. Every store and collaborator failure is
/// mapped into one of these before a handler returns.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Incorrect password")]
    InvalidCredentials,

    #[error("Please verify your email first")]
    NotVerified,

    #[error("User is not accepting messages")]
    NotAccepting,

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to send verification email")]
    Delivery,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotVerified | ApiError::NotAccepting => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Delivery | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!(error = %err, "request failed");
        }

        let body = Json(ApiResponse {
            success: false,
            message: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}
