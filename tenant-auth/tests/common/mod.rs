//! Shared fixtures for tenant-auth integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use service_core::config as core_config;
use tenant_auth::{
    config::{AuthConfig, EphemeralTokenConfig, Environment, JwtConfig, RedisConfig},
    models::{Organization, OrganizationId, UserRecord},
    services::{
        InMemoryDirectory, InMemoryTokenStore, JwtService, ManagerWithoutOrganization,
        OrganizationRepository,
    },
    AuthState,
};

pub const TEST_SECRET: &str = "+q3uCqso90X1ZI7EfZJjfyDv9OeEfwoFmhvS3QTR";

pub fn test_config(expiration_ms: i64) -> AuthConfig {
    AuthConfig {
        common: core_config::Config::default(),
        environment: Environment::Dev,
        service_name: "tenant-auth-test".to_string(),
        log_level: "error".to_string(),
        jwt: JwtConfig {
            secret: SecretString::new(TEST_SECRET.to_string()),
            expiration_ms,
        },
        redis: RedisConfig {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        },
        ephemeral_tokens: EphemeralTokenConfig { ttl_seconds: 60 },
        manager_without_organization: ManagerWithoutOrganization::Bootstrap,
    }
}

pub fn jwt(expiration_ms: i64) -> JwtService {
    JwtService::new(&test_config(expiration_ms).jwt)
}

/// Organization repository that counts lookups.
pub struct CountingRepository {
    inner: Arc<InMemoryDirectory>,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new(inner: Arc<InMemoryDirectory>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrganizationRepository for CountingRepository {
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_organization(id).await
    }
}

/// Repository whose backend is down.
pub struct FailingRepository;

#[async_trait]
impl OrganizationRepository for FailingRepository {
    async fn find_organization(
        &self,
        _id: OrganizationId,
    ) -> Result<Option<Organization>, anyhow::Error> {
        Err(anyhow::anyhow!("organization lookup timed out"))
    }
}

/// Two companies, one hiring manager each, and a candidate.
pub struct Tenants {
    pub directory: Arc<InMemoryDirectory>,
    pub org1: Organization,
    pub org2: Organization,
    pub hiring_manager1: UserRecord,
    pub hiring_manager2: UserRecord,
    pub candidate: UserRecord,
}

impl Tenants {
    pub fn seed() -> Self {
        let directory = Arc::new(InMemoryDirectory::new());

        let mut hiring_manager1 = UserRecord::hiring_manager("hm1@companya.com", "hm1", None);
        let mut hiring_manager2 = UserRecord::hiring_manager("hm2@companyb.com", "hm2", None);
        let candidate = UserRecord::candidate("candidate@example.com", "candidate1");

        let org1 = Organization::new("Company A", Some("Tech".to_string()), Some(hiring_manager1.id));
        let org2 = Organization::new("Company B", Some("Finance".to_string()), Some(hiring_manager2.id));

        hiring_manager1.organization_id = Some(org1.id);
        hiring_manager2.organization_id = Some(org2.id);

        directory.insert_organization(org1.clone());
        directory.insert_organization(org2.clone());
        directory.insert_user(hiring_manager1.clone());
        directory.insert_user(hiring_manager2.clone());
        directory.insert_user(candidate.clone());

        Self {
            directory,
            org1,
            org2,
            hiring_manager1,
            hiring_manager2,
            candidate,
        }
    }

    pub fn state(&self, config: &AuthConfig) -> AuthState {
        AuthState::new(
            config,
            self.directory.clone(),
            self.directory.clone(),
            Arc::new(InMemoryTokenStore::new()),
        )
    }

    pub fn token_for(&self, jwt: &JwtService, user: &UserRecord) -> String {
        jwt.issue(user.id, &user.email, user.role, false, &user.username)
            .expect("token should be issued")
    }
}
