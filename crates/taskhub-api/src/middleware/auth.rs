//! JWT authentication middleware
//!
//! Validates the bearer token on every protected route before any handler
//! logic runs, and makes the authenticated identity available to handlers
//! via Axum's Extension.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskhub_auth::{AuthConfig, JwtValidator};
use uuid::Uuid;

use crate::error::ApiError;

/// Authenticated user context extracted from the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Subject id, parsed into a typed value exactly once
    pub user_id: Uuid,
    /// Email claim
    pub email: String,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    /// Create new JWT state for the given signing configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(config)),
        }
    }
}

/// Authentication middleware for protected routes
///
/// Extracts the token from the "Authorization: Bearer <token>" header and
/// validates signature, expiration, issuer and audience. Rejects with 401
/// if the header is absent, the scheme is wrong, or validation fails; the
/// response carries no detail about which check failed.
pub async fn require_auth(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(ApiError::invalid_token)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(ApiError::invalid_token)?;

    let claims = state
        .validator
        .validate(token)
        .map_err(|_| ApiError::invalid_token())?;

    let user_id = claims.user_id().map_err(|_| ApiError::invalid_token())?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
