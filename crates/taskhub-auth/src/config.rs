//! Process-wide token configuration

/// Immutable signing configuration, resolved once at startup.
///
/// The server binary builds this from required arguments and passes it by
/// reference to token issuance and validation. A missing setting aborts
/// startup; nothing here is re-read per request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric HMAC-SHA-256 signing secret
    pub signing_secret: String,
    /// Value of the `iss` claim, enforced on inbound tokens
    pub issuer: String,
    /// Value of the `aud` claim, enforced on inbound tokens
    pub audience: String,
}

impl AuthConfig {
    pub fn new(
        signing_secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }
}
