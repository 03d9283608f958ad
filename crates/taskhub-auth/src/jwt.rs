//! JWT (JSON Web Token) issuance and validation

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

/// Fixed token lifetime: one hour from issuance.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// JWT claims for an authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user UUID)
    pub sub: String,
    /// Email of the subject
    pub email: String,
    /// Unique token id (replay-detection / revocation hook, unused today)
    pub jti: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Build the claims for a freshly verified credential.
    pub fn new(user_id: Uuid, email: String, config: &AuthConfig) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.to_string(),
            email,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Expiration as a concrete timestamp, for response payloads.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Parse the subject claim back into a typed user id.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// JWT validator pinned to the configured secret, issuer and audience
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Create a validator using HMAC-SHA256 (symmetric secret).
    ///
    /// Validates signature, expiration, issuer and audience. Leeway is
    /// zero: a token is rejected the second after its `exp`.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);

        Self {
            decoding_key: DecodingKey::from_secret(config.signing_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a compact JWT and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    _ => JwtError::InvalidToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Encode claims into a signed compact JWT (HMAC-SHA256).
    pub fn encode(config: &AuthConfig, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(config.signing_secret.as_bytes());

        Ok(encode(&header, claims, &encoding_key)?)
    }
}
