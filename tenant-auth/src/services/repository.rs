//! Lookup capabilities supplied by the persistence layer.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::{Organization, OrganizationId, UserId, UserRecord};

/// Resolves user accounts for token subjects.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, anyhow::Error>;
}

/// Resolves tenant records. Implementations apply their own timeouts and
/// report failures as errors; the core propagates them unchanged.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, anyhow::Error>;
}

/// Map-backed directory for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, UserRecord>,
    organizations: DashMap<OrganizationId, Organization>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.organizations.insert(organization.id, organization);
    }

    pub fn remove_organization(&self, id: OrganizationId) {
        self.organizations.remove(&id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, anyhow::Error> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryDirectory {
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, anyhow::Error> {
        Ok(self.organizations.get(&id).map(|entry| entry.value().clone()))
    }
}
