//! Error taxonomy for the API surface
//!
//! Every failure a handler can produce is mapped here, at the request
//! boundary, to a status code and an `ErrorResponse` body. Nothing
//! propagates as an uncaught fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// Duplicate email at registration
    #[error("{0}")]
    Conflict(String),

    /// Invalid login credentials, or a missing/invalid/expired token
    #[error("{message}")]
    Unauthenticated {
        message: &'static str,
        code: &'static str,
    },

    /// Authenticated but not permitted to act on the target resource
    #[error("{0}")]
    Forbidden(String),

    /// Target resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure; detail goes to the server log only
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Undifferentiated login failure: unknown email and wrong password
    /// produce the identical response.
    pub fn invalid_credentials() -> Self {
        Self::Unauthenticated {
            message: "Invalid credentials",
            code: "INVALID_CREDENTIALS",
        }
    }

    /// Missing, malformed, tampered or expired bearer token.
    pub fn invalid_token() -> Self {
        Self::Unauthenticated {
            message: "Invalid or expired token",
            code: "INVALID_TOKEN",
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Unauthenticated { code, .. } => (StatusCode::UNAUTHORIZED, code),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        }
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref source) = self {
            error!("internal error: {source:#}");
        }

        let (status, code) = self.status_and_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: Some(code.to_string()),
        });

        (status, body).into_response()
    }
}
