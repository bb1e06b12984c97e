use serde::{Deserialize, Serialize};

use super::{OrganizationId, Role, UserId};

/// User account as returned by the identity-lookup capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
}

impl UserRecord {
    pub fn candidate(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            username: username.into(),
            role: Role::Candidate,
            organization_id: None,
        }
    }

    pub fn hiring_manager(
        email: impl Into<String>,
        username: impl Into<String>,
        organization_id: Option<OrganizationId>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            username: username.into(),
            role: Role::HiringManager,
            organization_id,
        }
    }
}
