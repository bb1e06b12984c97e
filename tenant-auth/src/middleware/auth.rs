use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::models::Principal;
use crate::services::{bearer_token, AuthError, OrganizationContext};
use crate::AuthState;

/// Middleware to require authentication.
///
/// On success the request carries its [`Principal`] in extensions.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            AppError::AuthError(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let principal = state
        .authenticator
        .authenticate(token)
        .await
        .map_err(|e| match e {
            // Unknown or mismatched accounts are authentication failures here,
            // not tenant violations.
            AuthError::Unauthorized(msg) => AppError::AuthError(anyhow::anyhow!(msg)),
            other => AppError::from(other),
        })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Extractor for the authenticated principal.
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::AuthError(anyhow::anyhow!("Authentication required")))
    }
}

/// Extractor for the request's tenant scope.
///
/// ```ignore
/// async fn list_job_posts(RequestOrganization(ctx): RequestOrganization) -> Result<_, AppError> {
///     let org_id = ctx.require_organization_id()?;
///     // ...
/// }
/// ```
pub struct RequestOrganization(pub OrganizationContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequestOrganization
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        let auth = AuthState::from_ref(state);
        Ok(RequestOrganization(auth.organization_context(principal)?))
    }
}

/// Extractor for routes that serve anonymous callers too.
///
/// Yields `None` when no bearer token is presented or when the token does
/// not authenticate. Backend failures still reject the request.
pub struct MaybeAuthUser(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(MaybeAuthUser(Some(principal.clone())));
        }

        let Some(token) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
        else {
            return Ok(MaybeAuthUser(None));
        };

        let auth = AuthState::from_ref(state);
        match auth.authenticator.authenticate(token).await {
            Ok(principal) => Ok(MaybeAuthUser(Some(principal))),
            Err(e @ (AuthError::Lookup(_) | AuthError::Store(_) | AuthError::Issue(_))) => {
                Err(AppError::from(e))
            }
            Err(e) => {
                tracing::debug!(reason = %e, "Continuing without authentication");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

/// Tenant scope for routes with optional authentication; `None` for
/// anonymous callers.
pub struct MaybeOrganization(pub Option<OrganizationContext>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeOrganization
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(principal) = MaybeAuthUser::from_request_parts(parts, state).await?;
        let context = match principal {
            Some(principal) => Some(AuthState::from_ref(state).organization_context(principal)?),
            None => None,
        };
        Ok(MaybeOrganization(context))
    }
}
