use async_trait::async_trait;
use dashmap::DashMap;

use crate::services::AuthError;

/// Pending single-use tokens for out-of-band flows (registration
/// confirmation, invitation acceptance), at most one per email.
///
/// Registration and invitation flows only call [`TokenStore::add_token`];
/// reading is reserved for the verification flow.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Store `token` for `email`, replacing any previous token.
    async fn add_token(&self, email: &str, token: &str) -> Result<(), AuthError>;

    /// The current token for `email`, if any.
    async fn get_token(&self, email: &str) -> Result<Option<String>, AuthError>;

    /// Drop every stored token.
    async fn clear(&self) -> Result<(), AuthError>;

    async fn health_check(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Email keys are compared case-insensitively by every backend.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-process store for tests and single-node development.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: DashMap<String, String>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn add_token(&self, email: &str, token: &str) -> Result<(), AuthError> {
        tracing::debug!(email = %email, "Storing ephemeral token");
        self.tokens.insert(normalize_email(email), token.to_string());
        Ok(())
    }

    async fn get_token(&self, email: &str) -> Result<Option<String>, AuthError> {
        tracing::debug!(email = %email, "Retrieving ephemeral token");
        Ok(self
            .tokens
            .get(&normalize_email(email))
            .map(|entry| entry.value().clone()))
    }

    async fn clear(&self) -> Result<(), AuthError> {
        self.tokens.clear();
        Ok(())
    }
}
