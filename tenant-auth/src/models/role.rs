use serde::{Deserialize, Serialize};

/// Caller roles. The set is closed: every organization guard matches on it
/// exhaustively, so a new role is a compile-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Candidate,
    HiringManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "CANDIDATE",
            Role::HiringManager => "HIRING_MANAGER",
        }
    }

    /// Whether principals of this role may be associated with an organization.
    pub fn carries_tenant(&self) -> bool {
        match self {
            Role::Candidate => false,
            Role::HiringManager => true,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CANDIDATE" => Ok(Role::Candidate),
            "HIRING_MANAGER" => Ok(Role::HiringManager),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}
