use super::{OrganizationId, Role, UserId, UserRecord};

/// Anything a token can be checked against: only the username is compared.
pub trait Identity {
    fn username(&self) -> &str;
}

impl Identity for str {
    fn username(&self) -> &str {
        self
    }
}

impl Identity for String {
    fn username(&self) -> &str {
        self.as_str()
    }
}

impl Identity for UserRecord {
    fn username(&self) -> &str {
        &self.username
    }
}

/// Role-tagged tenant association.
///
/// Candidates have no variant field for an organization, so a candidate
/// principal can never carry one. A hiring manager's organization is absent
/// only until their organization has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affiliation {
    Candidate,
    HiringManager {
        organization_id: Option<OrganizationId>,
    },
}

impl Affiliation {
    /// Build the affiliation for a stored role. An organization recorded
    /// against a candidate is dropped.
    pub fn for_role(role: Role, organization_id: Option<OrganizationId>) -> Self {
        match role {
            Role::Candidate => {
                if organization_id.is_some() {
                    tracing::warn!("Ignoring organization association recorded for a candidate");
                }
                Affiliation::Candidate
            }
            Role::HiringManager => Affiliation::HiringManager { organization_id },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Affiliation::Candidate => Role::Candidate,
            Affiliation::HiringManager { .. } => Role::HiringManager,
        }
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Affiliation::Candidate => None,
            Affiliation::HiringManager { organization_id } => *organization_id,
        }
    }
}

/// The validated identity attached to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: UserId,
    email: String,
    username: String,
    affiliation: Affiliation,
    impersonation: bool,
}

impl Principal {
    pub fn new(
        subject_id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        affiliation: Affiliation,
        impersonation: bool,
    ) -> Self {
        Self {
            subject_id,
            email: email.into(),
            username: username.into(),
            affiliation,
            impersonation,
        }
    }

    pub fn from_record(record: &UserRecord, impersonation: bool) -> Self {
        Self::new(
            record.id,
            record.email.clone(),
            record.username.clone(),
            Affiliation::for_role(record.role, record.organization_id),
            impersonation,
        )
    }

    pub fn subject_id(&self) -> UserId {
        self.subject_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn affiliation(&self) -> Affiliation {
        self.affiliation
    }

    pub fn role(&self) -> Role {
        self.affiliation.role()
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.affiliation.organization_id()
    }

    pub fn impersonation(&self) -> bool {
        self.impersonation
    }
}

impl Identity for Principal {
    fn username(&self) -> &str {
        &self.username
    }
}
