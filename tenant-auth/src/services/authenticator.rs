use std::sync::Arc;

use crate::models::{Principal, UserId};
use crate::services::{AuthError, JwtService, UserDirectory};

const BEARER_PREFIX: &str = "Bearer ";

/// Token part of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Turns a presented token into the request's [`Principal`].
#[derive(Clone)]
pub struct Authenticator {
    jwt: JwtService,
    users: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(jwt: JwtService, users: Arc<dyn UserDirectory>) -> Self {
        Self { jwt, users }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Validate `token` and resolve its subject.
    ///
    /// Only full tokens authenticate a request: the subject must be a user id
    /// and the role claim must be present. The organization association
    /// comes from the stored account, not from the token.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.jwt.decode(token)?;

        let subject: UserId = claims.sub.parse().map_err(|_| AuthError::MalformedToken)?;
        let token_role = claims.role.ok_or(AuthError::MalformedToken)?;

        let user = self
            .users
            .find_user(subject)
            .await
            .map_err(AuthError::Lookup)?
            .ok_or_else(|| {
                tracing::warn!(user_id = %subject, "Token subject not found");
                AuthError::unauthorized("User not found")
            })?;

        if user.username != claims.username {
            tracing::warn!(user_id = %subject, "Token username does not match account");
            return Err(AuthError::unauthorized("Token does not match user"));
        }

        if user.role != token_role {
            tracing::debug!(
                user_id = %subject,
                token_role = %token_role,
                stored_role = %user.role,
                "Role changed since token issue; using stored role"
            );
        }

        let principal = Principal::from_record(&user, claims.impersonation());
        tracing::debug!(user_id = %subject, role = %principal.role(), "Authenticated user");
        Ok(principal)
    }
}
