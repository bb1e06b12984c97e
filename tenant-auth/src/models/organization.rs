use serde::{Deserialize, Serialize};

use super::{OrganizationId, UserId};

/// Tenant record as returned by the organization repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    /// The hiring manager who set the organization up.
    pub created_by: Option<UserId>,
}

impl Organization {
    pub fn new(name: impl Into<String>, industry: Option<String>, created_by: Option<UserId>) -> Self {
        Self {
            id: OrganizationId::new(),
            name: name.into(),
            industry,
            description: None,
            website: None,
            created_by,
        }
    }
}
