pub mod ids;
pub mod organization;
pub mod principal;
pub mod role;
pub mod user;

pub use ids::{OrganizationId, UserId};
pub use organization::Organization;
pub use principal::{Affiliation, Identity, Principal};
pub use role::Role;
pub use user::UserRecord;
