use service_core::error::AppError;
use thiserror::Error;

/// Failures surfaced by the token codec, the authenticator, the organization
/// guards and the ephemeral token store. Messages never contain a secret or
/// a token.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    Signature,

    #[error("Token expired")]
    ExpiredToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Failed to issue token: {0}")]
    Issue(String),

    #[error("Lookup failed: {0}")]
    Lookup(anyhow::Error),

    #[error("Token store error: {0}")]
    Store(anyhow::Error),
}

impl AuthError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// True for failures that only a fresh sign-in can fix.
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::ExpiredToken)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MalformedToken | AuthError::Signature => {
                AppError::AuthError(anyhow::anyhow!("Invalid token"))
            }
            AuthError::ExpiredToken => AppError::AuthError(anyhow::anyhow!("Token expired")),
            AuthError::Unauthorized(msg) => AppError::Forbidden(anyhow::anyhow!(msg)),
            AuthError::Issue(msg) => AppError::InternalError(anyhow::anyhow!(msg)),
            AuthError::Lookup(e) | AuthError::Store(e) => AppError::InternalError(e),
        }
    }
}
