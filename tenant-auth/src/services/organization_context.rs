use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::models::{Affiliation, Organization, OrganizationId, Principal};
use crate::services::{AuthError, OrganizationRepository};

pub const MUST_BELONG_TO_ORGANIZATION: &str =
    "User must belong to an organization to perform this action";
pub const NO_ORGANIZATION_ACCESS: &str = "You don't have access to this organization's data";
pub const MANAGER_WITHOUT_ORGANIZATION: &str = "Hiring manager must belong to an organization";

/// How to treat a hiring manager whose organization has not been created yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManagerWithoutOrganization {
    /// Allowed; the organization getters return `None`.
    #[default]
    Bootstrap,
    /// Refused when the request context is built.
    Reject,
}

impl std::str::FromStr for ManagerWithoutOrganization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bootstrap" => Ok(ManagerWithoutOrganization::Bootstrap),
            "reject" => Ok(ManagerWithoutOrganization::Reject),
            _ => Err(format!("Invalid manager-without-organization policy: {}", s)),
        }
    }
}

/// Tenant scope of one authenticated request.
///
/// Built once per request from the validated [`Principal`] and dropped with
/// it. The organization record is fetched at most once and reused by every
/// guard called on the same context.
pub struct OrganizationContext {
    principal: Principal,
    organizations: Arc<dyn OrganizationRepository>,
    organization: OnceCell<Option<Organization>>,
}

impl OrganizationContext {
    pub fn new(
        principal: Principal,
        organizations: Arc<dyn OrganizationRepository>,
        policy: ManagerWithoutOrganization,
    ) -> Result<Self, AuthError> {
        match (principal.affiliation(), policy) {
            (
                Affiliation::HiringManager {
                    organization_id: None,
                },
                ManagerWithoutOrganization::Reject,
            ) => {
                tracing::warn!(
                    user_id = %principal.subject_id(),
                    "Hiring manager without organization refused"
                );
                return Err(AuthError::unauthorized(MANAGER_WITHOUT_ORGANIZATION));
            }
            (Affiliation::HiringManager { .. }, _) | (Affiliation::Candidate, _) => {}
        }

        Ok(Self {
            principal,
            organizations,
            organization: OnceCell::new(),
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn current_user_email(&self) -> &str {
        self.principal.email()
    }

    pub fn current_organization_id(&self) -> Option<OrganizationId> {
        match self.principal.affiliation() {
            Affiliation::Candidate => None,
            Affiliation::HiringManager { organization_id } => organization_id,
        }
    }

    /// `Ok(None)` for candidates, unassociated managers, and references the
    /// repository no longer knows.
    pub async fn current_organization(&self) -> Result<Option<Organization>, AuthError> {
        let id = match self.principal.affiliation() {
            Affiliation::Candidate => return Ok(None),
            Affiliation::HiringManager { organization_id: None } => return Ok(None),
            Affiliation::HiringManager { organization_id: Some(id) } => id,
        };

        let organization = self
            .organization
            .get_or_try_init(|| async {
                let found = self
                    .organizations
                    .find_organization(id)
                    .await
                    .map_err(AuthError::Lookup)?;
                if found.is_none() {
                    tracing::warn!(organization_id = %id, "Organization reference is stale");
                }
                Ok::<_, AuthError>(found)
            })
            .await?;

        Ok(organization.clone())
    }

    pub fn require_organization_id(&self) -> Result<OrganizationId, AuthError> {
        self.current_organization_id()
            .ok_or_else(|| AuthError::unauthorized(MUST_BELONG_TO_ORGANIZATION))
    }

    pub async fn require_organization(&self) -> Result<Organization, AuthError> {
        self.current_organization()
            .await?
            .ok_or_else(|| AuthError::unauthorized(MUST_BELONG_TO_ORGANIZATION))
    }

    pub fn verify_organization_access(&self, target: OrganizationId) -> Result<(), AuthError> {
        if self.belongs_to_organization(Some(target)) {
            return Ok(());
        }

        tracing::warn!(
            user_id = %self.principal.subject_id(),
            "Cross-organization access refused"
        );
        Err(AuthError::unauthorized(NO_ORGANIZATION_ACCESS))
    }

    pub fn belongs_to_organization(&self, organization_id: Option<OrganizationId>) -> bool {
        match (self.current_organization_id(), organization_id) {
            (Some(current), Some(requested)) => current == requested,
            _ => false,
        }
    }

    pub fn is_candidate(&self) -> bool {
        match self.principal.affiliation() {
            Affiliation::Candidate => true,
            Affiliation::HiringManager { .. } => false,
        }
    }
}

/// True for anonymous requests and for candidates: callers that only see
/// public data.
pub fn is_candidate_or_unauthenticated(scope: Option<&OrganizationContext>) -> bool {
    match scope {
        None => true,
        Some(ctx) => ctx.is_candidate(),
    }
}
