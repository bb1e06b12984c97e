pub mod authenticator;
pub mod error;
pub mod jwt;
pub mod organization_context;
pub mod redis_store;
pub mod repository;
pub mod token_store;

pub use authenticator::{bearer_token, Authenticator};
pub use error::AuthError;
pub use jwt::{Claims, JwtService};
pub use organization_context::{
    is_candidate_or_unauthenticated, ManagerWithoutOrganization, OrganizationContext,
};
pub use redis_store::RedisTokenStore;
pub use repository::{InMemoryDirectory, OrganizationRepository, UserDirectory};
pub use token_store::{InMemoryTokenStore, TokenStore};
