//! Signed identity tokens and tenant-scoped authorization.
//!
//! The crate validates bearer tokens into a [`models::Principal`], scopes each
//! request to the caller's organization through
//! [`services::OrganizationContext`], and keeps single-use tokens for
//! registration and invitation flows in a [`services::TokenStore`].

pub mod config;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use service_core::error::AppError;

use crate::config::AuthConfig;
use crate::models::Principal;
use crate::services::{
    AuthError, Authenticator, JwtService, ManagerWithoutOrganization, OrganizationContext,
    OrganizationRepository, RedisTokenStore, TokenStore, UserDirectory,
};

/// Shared state for the authentication boundary.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Authenticator,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub tokens: Arc<dyn TokenStore>,
    pub manager_without_organization: ManagerWithoutOrganization,
}

impl AuthState {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserDirectory>,
        organizations: Arc<dyn OrganizationRepository>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt);
        Self {
            authenticator: Authenticator::new(jwt, users),
            organizations,
            tokens,
            manager_without_organization: config.manager_without_organization,
        }
    }

    /// Build the state with the Redis-backed token store.
    pub async fn connect(
        config: &AuthConfig,
        users: Arc<dyn UserDirectory>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Result<Self, AppError> {
        let tokens = RedisTokenStore::new(&config.redis, &config.ephemeral_tokens)
            .await
            .map_err(AppError::InternalError)?;
        Ok(Self::new(config, users, organizations, Arc::new(tokens)))
    }

    pub fn jwt(&self) -> &JwtService {
        self.authenticator.jwt()
    }

    /// Tenant scope for one request.
    pub fn organization_context(
        &self,
        principal: Principal,
    ) -> Result<OrganizationContext, AuthError> {
        OrganizationContext::new(
            principal,
            self.organizations.clone(),
            self.manager_without_organization,
        )
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.tokens.health_check().await.map_err(|e| {
            tracing::error!(error = %e, "Token store health check failed");
            AppError::from(e)
        })
    }
}
